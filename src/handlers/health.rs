use actix_web::{HttpResponse, Responder, get, http::header::ContentType, web};

use crate::app_state::AppState;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Single-page dashboard
#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(INDEX_HTML)
}

/// Service description and loaded layers
#[get("/api")]
pub async fn api_info(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "scenes": data.scenes.ids(),
        "volume": {
            "dim": data.ct.dim(),
            "spacing": data.ct.spacing(),
            "range": data.ct.value_range(),
        },
        "layers": {
            "ct": true,
            "solid": data.solid.is_some(),
        },
        "porosity_rows": data.porosity.as_ref().map(|t| t.len()),
    }))
}
