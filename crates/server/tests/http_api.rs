use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use async_trait::async_trait;
use serde_json::{Value, json};
use server::handlers::Outcome;
use services::DistributionService;
use storage::{CounterStore, Storage, StorageError};

struct DownCounters;

#[async_trait]
impl CounterStore for DownCounters {
    async fn incr(&self, _key: &str) -> Result<u64, StorageError> {
        Err(StorageError::Connection("store offline".into()))
    }

    async fn get(&self, _key: &str) -> Result<u64, StorageError> {
        Err(StorageError::Connection("store offline".into()))
    }

    async fn get_many(&self, _keys: &[String]) -> Result<Vec<u64>, StorageError> {
        Err(StorageError::Connection("store offline".into()))
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Err(StorageError::Connection("store offline".into()))
    }
}

fn in_memory_service() -> DistributionService {
    DistributionService::new(Storage::in_memory().counters)
}

fn down_service() -> DistributionService {
    DistributionService::new(Arc::new(DownCounters))
}

macro_rules! app {
    ($service:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($service))
                .configure(server::routes),
        )
        .await
    };
}

#[actix_web::test]
async fn submitted_scores_show_up_in_distribution() {
    let app = app!(in_memory_service());

    for accuracy in [100.0, 95.0, 55.0, 0.0] {
        let req = test::TestRequest::post()
            .uri("/api/submit-score")
            .set_json(json!({ "accuracy": accuracy }))
            .to_request();
        let body: Outcome = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            body,
            Outcome {
                success: true,
                error: None
            }
        );
    }

    let req = test::TestRequest::get()
        .uri("/api/get-distribution")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["totalGames"], 4);

    let rows = body["distribution"].as_array().unwrap();
    assert_eq!(rows.len(), 10);
    assert_eq!(rows[0], json!({"range": "0-9", "count": 1, "percentOfPlayers": 25}));
    assert_eq!(rows[5]["range"], "50-59");
    assert_eq!(rows[5]["count"], 1);
    assert_eq!(rows[9], json!({"range": "90-100", "count": 2, "percentOfPlayers": 50}));
}

#[actix_web::test]
async fn out_of_range_and_malformed_scores_are_rejected() {
    let service = in_memory_service();
    let app = app!(service.clone());

    for body in [
        json!({ "accuracy": 101 }),
        json!({ "accuracy": -1 }),
        json!({ "accuracy": "high" }),
        json!({}),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/submit-score")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Outcome = test::read_body_json(resp).await;
        assert!(!body.success);
        assert_eq!(body.error.as_deref(), Some("Invalid accuracy value"));
    }

    assert_eq!(service.distribution().await.unwrap().total_samples, 0);
}

#[actix_web::test]
async fn wrong_method_is_405() {
    let app = app!(in_memory_service());

    let req = test::TestRequest::get().uri("/api/submit-score").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

    let req = test::TestRequest::delete()
        .uri("/api/get-distribution")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[actix_web::test]
async fn store_failure_is_500_on_write_and_empty_on_read() {
    let app = app!(down_service());

    let req = test::TestRequest::post()
        .uri("/api/submit-score")
        .set_json(json!({ "accuracy": 70 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Outcome = test::read_body_json(resp).await;
    assert!(!body.success);

    let req = test::TestRequest::get()
        .uri("/api/get-distribution")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "distribution": [], "totalGames": 0 }));
}

#[actix_web::test]
async fn health_reflects_store_reachability() {
    let app = app!(in_memory_service());
    let req = test::TestRequest::get().uri("/health").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let app = app!(down_service());
    let req = test::TestRequest::get().uri("/health").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::SERVICE_UNAVAILABLE
    );
}
