//! HTTP boundary for the population accuracy histogram.
//!
//! Two JSON endpoints under `/api` plus a `/health` probe. All state lives in
//! the counter store behind [`DistributionService`].

pub mod handlers;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use services::DistributionService;

/// Listener settings for [`run`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_owned(),
            workers: 4,
        }
    }
}

/// Register every route on an app or test service.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(handlers::json_config())
        .route("/health", web::get().to(handlers::health))
        .service(
            web::scope("/api")
                .service(
                    web::resource("/submit-score")
                        .route(web::post().to(handlers::submit_score))
                        .default_service(web::to(handlers::method_not_allowed)),
                )
                .service(
                    web::resource("/get-distribution")
                        .route(web::get().to(handlers::get_distribution))
                        .default_service(web::to(handlers::method_not_allowed)),
                ),
        );
}

/// Serve until the process is interrupted.
///
/// # Errors
///
/// Returns the bind or accept error from the listener.
pub async fn run(config: ServerConfig, service: DistributionService) -> std::io::Result<()> {
    let service = web::Data::new(service);
    log::info!("starting score server on {}", config.bind_addr);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .app_data(service.clone())
            .configure(routes)
    })
    .workers(config.workers.max(1))
    .bind(&config.bind_addr)?
    .run()
    .await
}
