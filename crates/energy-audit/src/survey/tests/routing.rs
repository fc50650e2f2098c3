use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::assistant::AssistantError;
use crate::survey::domain::SurveyRecord;
use crate::survey::router::{bearer_token, submit_handler, SurveyState};
use crate::survey::{survey_router, SurveyService};

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("json body")))
        .expect("request builds")
}

fn authorized(method: &str, uri: &str, token: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .expect("request builds")
}

async fn login(router: &axum::Router) -> String {
    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/login",
            json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    payload["token"].as_str().expect("token").to_string()
}

#[tokio::test]
async fn edit_route_returns_next_record() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/surveys/edit",
            json!({
                "record": {},
                "edit": {
                    "op": "set_water",
                    "field": { "name": "pumpCapacity", "value": 0.5 }
                }
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["waterUsage"]["pumpCapacity"], json!(0.5));
    assert_eq!(payload["waterUsage"]["dailyPowerConsumption"], Value::Null);
}

#[tokio::test]
async fn edit_route_rejects_out_of_range_index() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/surveys/edit",
            json!({
                "record": {},
                "edit": { "op": "remove_fuel", "index": 2 }
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("error message")
        .contains("cooking fuel"));
}

#[tokio::test]
async fn summary_route_reports_rollups() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);
    let record = with_bill_consumptions(&[134.0, 158.0, 161.0]);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/surveys/summary",
            serde_json::to_value(&record).expect("record json"),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["bills"]["entries"], json!(3));
    let average = payload["average_daily_consumption_kwh"]
        .as_f64()
        .expect("average");
    assert!((average - 2.5167).abs() < 1e-4);
}

#[tokio::test]
async fn submit_route_creates_survey() {
    let (service, repository, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request("POST", "/api/v1/surveys", json!({})))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["id"], json!("survey-0001"));
    assert!(payload["submissionDate"].is_string());
    assert_eq!(repository.stored().len(), 1);
}

#[tokio::test]
async fn submit_handler_returns_unavailable_on_repository_failure() {
    let service = Arc::new(SurveyService::new(
        Arc::new(UnavailableRepository),
        Arc::new(ScriptedAssistant::default()),
        policy(),
    ));
    let state = SurveyState {
        service,
        auth: Arc::new(MemoryAuth::default()),
    };

    let response = submit_handler::<UnavailableRepository, ScriptedAssistant>(
        State(state),
        axum::Json(SurveyRecord::new()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn extract_route_rejects_non_pdf_uploads() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::post("/api/v1/bills/extract")
                .header(header::CONTENT_TYPE, "image/png")
                .body(Body::from(vec![0x89, 0x50, 0x4E, 0x47]))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn extract_route_returns_sanitized_details() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::post("/api/v1/bills/extract")
                .header(header::CONTENT_TYPE, "application/pdf")
                .body(Body::from("%PDF-1.4"))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let total = payload["billDetails"]["total"].as_f64().expect("total");
    assert!((total - 973.81).abs() < 1e-6);
    assert_eq!(payload["connectionDetails"]["tariffCategory"], json!("LT-1A"));
}

#[tokio::test]
async fn suggestions_route_maps_assistant_failure_to_bad_gateway() {
    let (service, _, _) = build_service_with(ScriptedAssistant::answering_suggestions(Err(
        AssistantError::MalformedResponse("not json".to_string()),
    )));
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request("POST", "/api/v1/surveys/suggestions", json!({})))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn admin_routes_require_a_session() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(
            Request::get("/api/v1/admin/surveys")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = router
        .oneshot(authorized(
            "GET",
            "/api/v1/admin/surveys",
            "forged",
            Body::empty(),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/login",
            json!({ "email": ADMIN_EMAIL, "password": "guess" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_can_list_amend_and_export_surveys() {
    let (service, _, _) = build_service();
    let service = Arc::new(service);
    let submitted = service
        .submit(with_bill_consumptions(&[134.0]))
        .expect("submission succeeds");
    let router = survey_router(service.clone(), Arc::new(MemoryAuth::default()));
    let token = login(&router).await;

    let response = router
        .clone()
        .oneshot(authorized(
            "GET",
            "/api/v1/admin/surveys",
            &token,
            Body::empty(),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.as_array().expect("list").len(), 1);

    let mut amended = submitted.clone();
    amended.appraiser_info.name = "Corrected".to_string();
    let response = router
        .clone()
        .oneshot(authorized(
            "PUT",
            "/api/v1/admin/surveys/survey-0001",
            &token,
            Body::from(serde_json::to_vec(&amended).expect("json")),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(authorized(
            "GET",
            "/api/v1/admin/surveys/export",
            &token,
            Body::empty(),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let csv = String::from_utf8(bytes.to_vec()).expect("utf8");
    assert!(csv.contains("Corrected"));

    let response = router
        .clone()
        .oneshot(authorized(
            "POST",
            "/api/v1/auth/logout",
            &token,
            Body::empty(),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = router
        .oneshot(authorized(
            "GET",
            "/api/v1/admin/surveys",
            &token,
            Body::empty(),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[test]
fn bearer_token_requires_scheme_and_value() {
    let mut headers = axum::http::HeaderMap::new();
    assert_eq!(bearer_token(&headers), None);

    headers.insert(header::AUTHORIZATION, "Basic abc".parse().expect("header"));
    assert_eq!(bearer_token(&headers), None);

    headers.insert(header::AUTHORIZATION, "Bearer token-7".parse().expect("header"));
    assert_eq!(bearer_token(&headers), Some("token-7"));
}
