use actix_web::{App, HttpServer, web};
use clap::Parser;
use log::{LevelFilter, error, info};
use simple_logger::SimpleLogger;

use rock_ct_dashboard::{AppState, DashboardError, Orientation, config::Config, routes};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = Config::parse();

    let level = if config.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    // RUST_LOG overrides the level
    if let Err(e) = SimpleLogger::new().with_level(level).env().init() {
        eprintln!("failed to initialize logger: {e}");
    }

    let load_config = config.clone();
    let loaded = tokio::task::spawn_blocking(move || AppState::load(&load_config))
        .await
        .map_err(DashboardError::from)
        .and_then(|state| state);
    let state = match loaded {
        Ok(state) => state,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    info!(
        "scene '{}': {} axial slices, percent layers: {}, porosity rows: {}",
        state.scene_id,
        state.ct.nslices(Orientation::Axial),
        state.percent.is_some(),
        state.porosity.as_ref().map_or(0, |t| t.len())
    );
    info!("dashboard at http://{}:{}", config.host, config.port);

    let app_state = web::Data::new(state);
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
