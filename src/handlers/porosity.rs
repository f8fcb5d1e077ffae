use actix_web::{HttpResponse, Responder, get, post, web};
use log::debug;
use serde::Deserialize;

use crate::app_state::AppState;
use crate::callbacks::{self, ALL, ClickData, LineSelection};
use crate::enums::Orientation;
use crate::porosity::DEFAULT_SELECTION;

fn no_table() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "no porosity table loaded",
    }))
}

/// Dropdown options of the porosity chart
#[get("/api/porosity/columns")]
pub async fn get_columns(data: web::Data<AppState>) -> impl Responder {
    let Some(table) = data.porosity.as_ref() else {
        return no_table();
    };
    let mut options: Vec<&str> = table.column_names().collect();
    options.push(ALL);
    HttpResponse::Ok().json(serde_json::json!({
        "depth": table.depth_name(),
        "options": options,
        "default": DEFAULT_SELECTION,
    }))
}

#[derive(Deserialize)]
pub struct FigureQuery {
    /// Column name or `All`
    pub value: Option<String>,
}

/// Line chart for the selected dropdown value, e.g. /api/porosity/figure?value=All
#[get("/api/porosity/figure")]
pub async fn get_figure(
    data: web::Data<AppState>,
    query: web::Query<FigureQuery>,
) -> impl Responder {
    let Some(table) = data.porosity.as_ref() else {
        return no_table();
    };
    let value = query.value.as_deref().unwrap_or(DEFAULT_SELECTION);
    match callbacks::update_line_chart(table, &LineSelection::parse(value)) {
        Ok(figure) => HttpResponse::Ok().json(figure),
        Err(err) => HttpResponse::BadRequest().json(serde_json::json!({
            "error": err.to_string(),
            "value": value,
        })),
    }
}

/// Chart click: moves the scene's axial slicer to the clicked row.
/// The body is Plotly `clickData`, or `null` when nothing is selected.
#[post("/api/porosity/click")]
pub async fn click_line(
    data: web::Data<AppState>,
    body: web::Json<Option<ClickData>>,
) -> impl Responder {
    let Some(scene) = data.scene() else {
        return super::unknown_scene(&data.scene_id);
    };
    let click = body.into_inner();
    let setpos = callbacks::click_to_seek(click.as_ref(), data.ct.nslices(Orientation::Axial));
    debug!("porosity click {:?} -> {:?}", click.map(|c| c.points.len()), setpos);
    let positions = scene.apply_setpos(setpos);

    HttpResponse::Ok().json(serde_json::json!({
        "setpos": setpos,
        "positions": positions,
    }))
}
