use actix_web::{HttpResponse, Responder, post, web};
use serde::Deserialize;

use crate::app_state::AppState;
use crate::enums::Orientation;
use crate::handlers::unknown_scene;

#[derive(Deserialize)]
pub struct DragBody {
    pub axis: usize,
    pub value: usize,
}

/// Builtin slider drag on one axis
#[post("/api/scenes/{scene}/drag")]
pub async fn drag_slider(
    data: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<DragBody>,
) -> impl Responder {
    let scene_id = path.into_inner();
    let Some(scene) = data.scenes.get(&scene_id) else {
        return unknown_scene(&scene_id);
    };
    let Some(orientation) = Orientation::from_axis(body.axis) else {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "axis must be 0, 1 or 2",
            "axis": body.axis,
        }));
    };

    let sliders = scene.drag(orientation, body.value);
    HttpResponse::Ok().json(serde_json::json!({
        "sliders": sliders,
        "positions": scene.snapshot().positions,
    }))
}

/// Navigation table fields; `x` belongs to the slicer on axis 0.
#[derive(Deserialize)]
pub struct NavBody {
    pub x: Option<usize>,
    pub y: Option<usize>,
    pub z: Option<usize>,
}

#[post("/api/scenes/{scene}/nav")]
pub async fn navigate(
    data: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<NavBody>,
) -> impl Responder {
    let scene_id = path.into_inner();
    let Some(scene) = data.scenes.get(&scene_id) else {
        return unknown_scene(&scene_id);
    };
    let positions = scene.navigate([body.x, body.y, body.z]);
    HttpResponse::Ok().json(serde_json::json!({
        "setpos": scene.snapshot().setpos,
        "positions": positions,
    }))
}
