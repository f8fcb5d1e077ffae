pub mod health;
pub mod navigation;
pub mod porosity;
pub mod slicer;

pub use health::{api_info, index};
pub use navigation::{drag_slider, navigate};
pub use porosity::{click_line, get_columns, get_figure};
pub use slicer::{get_hover, get_scene, get_slice};

use actix_web::HttpResponse;

pub(crate) fn unknown_scene(scene: &str) -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "unknown scene",
        "scene": scene,
    }))
}
