use actix_web::error::InternalError;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use services::DistributionService;

#[derive(Debug, Deserialize)]
pub struct SubmitScore {
    pub accuracy: f64,
}

/// Body of every submit-score response and of method errors.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Outcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Outcome {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

/// Malformed or non-numeric bodies get the same 400 shape as out-of-range scores.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::debug!("rejected submit-score body: {err}");
        let response = HttpResponse::BadRequest().json(Outcome::failed("Invalid accuracy value"));
        InternalError::from_response(err, response).into()
    })
}

pub async fn submit_score(
    service: web::Data<DistributionService>,
    req: web::Json<SubmitScore>,
) -> impl Responder {
    match service.report(req.accuracy).await {
        Ok(_) => HttpResponse::Ok().json(Outcome::ok()),
        Err(e) if e.is_validation() => {
            log::debug!("rejected score {}: {e}", req.accuracy);
            HttpResponse::BadRequest().json(Outcome::failed("Invalid accuracy value"))
        }
        Err(e) => {
            log::error!("failed to record score: {e}");
            HttpResponse::InternalServerError().json(Outcome::failed("Failed to submit score"))
        }
    }
}

pub async fn get_distribution(service: web::Data<DistributionService>) -> impl Responder {
    HttpResponse::Ok().json(service.distribution_or_empty().await)
}

pub async fn health(service: web::Data<DistributionService>) -> impl Responder {
    match service
        .health()
        .await
        .inspect_err(|e| log::error!("health check failed: {e}"))
    {
        Ok(()) => HttpResponse::Ok().body("ok"),
        Err(_) => HttpResponse::ServiceUnavailable().body("counter store unavailable"),
    }
}

pub async fn method_not_allowed() -> impl Responder {
    HttpResponse::MethodNotAllowed().json(Outcome::failed("Method not allowed"))
}
