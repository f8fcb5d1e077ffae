use std::fmt;

use actix_web::{HttpResponse, error::InternalError, web};

use crate::handlers;

/// Registers every HTTP route of the dashboard.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default().error_handler(|err, _req| bad_request("invalid JSON body", err)),
    )
    .app_data(
        web::PathConfig::default().error_handler(|err, _req| bad_request("invalid path", err)),
    )
    .app_data(
        web::QueryConfig::default().error_handler(|err, _req| bad_request("invalid query", err)),
    );

    cfg.service(handlers::index)
        .service(handlers::api_info)
        .service(handlers::get_columns)
        .service(handlers::get_figure)
        .service(handlers::click_line)
        .service(handlers::get_scene)
        .service(handlers::get_slice)
        .service(handlers::get_hover)
        .service(handlers::drag_slider)
        .service(handlers::navigate);
}

/// Extractor failures answer with the same JSON error shape as the handlers.
fn bad_request<E>(error: &str, err: E) -> actix_web::Error
where
    E: fmt::Debug + fmt::Display + 'static,
{
    let response = HttpResponse::BadRequest().json(serde_json::json!({
        "error": error,
        "details": err.to_string(),
    }));
    InternalError::from_response(err, response).into()
}
