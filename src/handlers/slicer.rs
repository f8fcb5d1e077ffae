use std::io::Cursor;

use actix_web::{HttpResponse, Responder, get, web};
use image::ImageFormat;
use serde::Deserialize;

use crate::app_state::{AppState, Layer};
use crate::enums::{Interpolation, Orientation};
use crate::handlers::unknown_scene;
use crate::percent::hover_text;
use crate::window::CtWindow;

#[get("/api/scenes/{scene}")]
pub async fn get_scene(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let scene_id = path.into_inner();
    let Some(scene) = data.scenes.get(&scene_id) else {
        return unknown_scene(&scene_id);
    };
    let layers: Vec<&str> = [Layer::Ct, Layer::Solid]
        .into_iter()
        .filter(|layer| data.layer(*layer).is_some())
        .map(Layer::name)
        .collect();
    HttpResponse::Ok().json(serde_json::json!({
        "scene": scene.snapshot(),
        "dim": data.ct.dim(),
        "spacing": data.ct.spacing(),
        "layers": layers,
    }))
}

#[derive(Deserialize)]
pub struct SliceQuery {
    /// Window level, defaults to the middle of the layer's value range
    pub level: Option<f32>,
    /// Window width, defaults to the layer's value range
    pub width: Option<f32>,
    /// Resample coronal and sagittal slices to isotropic pixels
    #[serde(default)]
    pub interpolate: bool,
}

/// One slice of a layer as PNG, e.g. /api/scenes/rock/slice/ct/0/250
#[get("/api/scenes/{scene}/slice/{layer}/{axis}/{index}")]
pub async fn get_slice(
    data: web::Data<AppState>,
    path: web::Path<(String, String, usize, usize)>,
    query: web::Query<SliceQuery>,
) -> impl Responder {
    let (scene_id, layer, axis, index) = path.into_inner();
    if data.scenes.get(&scene_id).is_none() {
        return unknown_scene(&scene_id);
    }
    let Some(orientation) = Orientation::from_axis(axis) else {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "axis must be 0, 1 or 2",
            "axis": axis,
        }));
    };
    let Some(layer) = Layer::parse(&layer) else {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "unknown layer",
            "layer": layer,
        }));
    };
    let Some(volume) = data.layer(layer).cloned() else {
        return HttpResponse::NotFound().json(serde_json::json!({
            "error": "layer not loaded",
            "layer": layer.name(),
        }));
    };

    let window = match (query.level, query.width) {
        (None, None) => None,
        (level, width) => {
            let (lo, hi) = volume.value_range();
            let level = level.unwrap_or(lo + (hi - lo) / 2.0);
            let width = width.unwrap_or((hi - lo).max(1.0));
            match CtWindow::new(level, width) {
                Some(window) => Some(window),
                None => {
                    return HttpResponse::BadRequest().json(serde_json::json!({
                        "error": "invalid window",
                        "level": level,
                        "width": width,
                    }));
                }
            }
        }
    };
    let interpolation = if query.interpolate {
        Interpolation::Bilinear
    } else {
        Interpolation::None
    };

    let encoded = web::block(move || {
        let image = volume.get_image_from_axis(index, orientation, interpolation, window)?;
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .ok()?;
        Some(bytes)
    })
    .await;

    match encoded {
        Ok(Some(bytes)) => HttpResponse::Ok()
            .content_type("image/png")
            .append_header(("X-Slice-Index", index.to_string()))
            .body(bytes),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "slice index out of range",
            "axis": axis,
            "index": index,
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": "failed to render slice",
            "details": e.to_string(),
        })),
    }
}

#[derive(Deserialize)]
pub struct HoverQuery {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

/// Tooltip content of one voxel
#[get("/api/scenes/{scene}/hover")]
pub async fn get_hover(
    data: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<HoverQuery>,
) -> impl Responder {
    let scene_id = path.into_inner();
    if data.scenes.get(&scene_id).is_none() {
        return unknown_scene(&scene_id);
    }
    let HoverQuery { x, y, z } = query.into_inner();
    let Some(value) = data.ct.value_at(z, y, x) else {
        return HttpResponse::NotFound().json(serde_json::json!({
            "error": "voxel out of range",
            "x": x,
            "y": y,
            "z": z,
        }));
    };

    let customdata = data
        .percent
        .as_ref()
        .and_then(|stack| stack.customdata(z, y, x));
    let text = match &customdata {
        Some(customdata) => hover_text(x, y, z, customdata),
        None => format!("x: {x} <br> y: {y} <br> z: {z} <br> value: {value:.4}"),
    };

    HttpResponse::Ok().json(serde_json::json!({
        "x": x,
        "y": y,
        "z": z,
        "value": value,
        "customdata": customdata,
        "text": text,
    }))
}
