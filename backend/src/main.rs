mod db;
mod ml;
mod routes;

use actix_web::{web, App, HttpServer};
use db::SqliteRepository;
use ml::PredictService;
use routes::configure_routes;
use std::env;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    dotenv::dotenv().ok();

    let database_path = env::var("DATABASE_PATH").unwrap_or_else(|_| "crime.db".to_string());
    let bundle_path = env::var("MODEL_PATH").unwrap_or_else(|_| "ml_model.json".to_string());
    let training_path =
        env::var("TRAINING_DATA_PATH").unwrap_or_else(|_| "data/training_data.csv".to_string());

    let repository = SqliteRepository::open(&database_path).map_err(|e| {
        std::io::Error::other(format!("failed to open store at {database_path}: {e}"))
    })?;
    log::info!("Using SQLite store at {database_path}");

    // Train once at first startup; an existing bundle is never retrained or
    // invalidated, whatever has happened to the training data since.
    let predict_service = PredictService::new(&bundle_path);
    match predict_service.ensure_trained(&training_path) {
        Ok(true) => log::info!("Trained model bundle from {training_path} into {bundle_path}"),
        Ok(false) => log::info!("Model bundle already present at {bundle_path}"),
        Err(e) => log::warn!(
            "Model training failed ({e}); /predict_suspect will report the model as not trained"
        ),
    }

    let repository = web::Data::new(repository);
    let predict_service = web::Data::new(predict_service);

    let port = env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind_address = format!("0.0.0.0:{port}");
    log::info!("Starting server on {bind_address}");

    HttpServer::new(move || {
        App::new()
            .app_data(repository.clone())
            .app_data(predict_service.clone())
            .configure(configure_routes)
    })
    .bind(bind_address)?
    .run()
    .await
}
