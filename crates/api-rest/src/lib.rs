//! # API REST
//!
//! REST API for the ward.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - Mapping of ward errors onto status codes
//!
//! Request bodies carry identifiers and labels as strings; they are parsed into `ward-core`
//! types before the ward lock is taken. All business rules live in `ward-core`.

#![warn(rust_2018_idioms)]

mod dto;
mod error;
mod handlers;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use ward_core::SharedWard;

pub use error::{status_for, ApiError, ErrorRes};

/// Application state shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    ward: SharedWard,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::list_floors,
        handlers::list_staff,
        handlers::list_rooms,
        handlers::get_room,
        handlers::set_room_condition,
        handlers::census,
        handlers::list_patients,
        handlers::register_patient,
        handlers::get_patient,
        handlers::update_patient,
        handlers::active_admissions,
        handlers::assign,
        handlers::transfer,
        handlers::get_transfer,
        handlers::complete_transfer,
        handlers::discharge,
        handlers::record_vitals,
        handlers::vitals_chart,
        handlers::audit,
    ),
    components(schemas(
        dto::HealthRes,
        dto::RoomConditionReq,
        dto::RegisterPatientReq,
        dto::UpdatePatientReq,
        dto::AssignReq,
        dto::TransferReq,
        dto::CompleteTransferReq,
        dto::ChecklistReq,
        dto::DischargeReq,
        dto::RecordVitalsReq,
        ErrorRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router over a shared ward, including Swagger UI at `/swagger-ui`.
pub fn router(ward: SharedWard) -> Router {
    let state = AppState { ward };

    Router::new()
        .route("/health", get(handlers::health))
        .route("/floors", get(handlers::list_floors))
        .route("/staff", get(handlers::list_staff))
        .route("/rooms", get(handlers::list_rooms))
        .route("/rooms/:id", get(handlers::get_room))
        .route("/rooms/:id/condition", put(handlers::set_room_condition))
        .route("/census", get(handlers::census))
        .route(
            "/patients",
            get(handlers::list_patients).post(handlers::register_patient),
        )
        .route(
            "/patients/:id",
            get(handlers::get_patient).put(handlers::update_patient),
        )
        .route(
            "/patients/:id/vitals",
            get(handlers::vitals_chart).post(handlers::record_vitals),
        )
        .route("/admissions", get(handlers::active_admissions))
        .route("/assignments", post(handlers::assign))
        .route("/transfers", post(handlers::transfer))
        .route("/transfers/:id", get(handlers::get_transfer))
        .route("/transfers/:id/complete", post(handlers::complete_transfer))
        .route("/discharges", post(handlers::discharge))
        .route("/audit", get(handlers::audit))
        .merge(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use ward_core::dataset;

    fn app() -> (Router, SharedWard) {
        let ward = SharedWard::new(dataset::bundled().unwrap());
        (router(ward.clone()), ward)
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn health_names_the_hospital() {
        let (app, _) = app();
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], json!(true));
        assert!(body["message"].as_str().unwrap().contains("General Hospital"));
    }

    #[tokio::test]
    async fn room_lookup_reports_derived_status() {
        let (app, _) = app();
        let (status, body) = send(&app, "GET", "/rooms/A-201", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], json!("occupied"));
        assert_eq!(body["beds"].as_array().unwrap().len(), 2);

        let (status, body) = send(&app, "GET", "/rooms/Z-999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("Z-999"));
    }

    #[tokio::test]
    async fn rooms_can_be_filtered_by_floor() {
        let (app, _) = app();
        let (status, body) = send(&app, "GET", "/rooms?floor=third", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 6);

        let (status, _) = send(&app, "GET", "/rooms?floor=roof", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn assigning_an_occupied_bed_is_a_conflict() {
        let (app, ward) = app();
        let request = json!({
            "patient": "P002",
            "room": "A-201",
            "bed": "A-201-1",
            "assignment_type": "admission",
            "actor": "N001",
        });
        let (status, body) = send(&app, "POST", "/assignments", Some(request)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("A-201-1"));
        assert_eq!(ward.read(|w| w.audit().len()).unwrap(), 0);
    }

    #[tokio::test]
    async fn assignment_then_lookup() {
        let (app, _) = app();
        let request = json!({
            "patient": "P002",
            "room": "A-202",
            "bed": "A-202-2",
            "assignment_type": "admission",
            "actor": "N001",
        });
        let (status, _) = send(&app, "POST", "/assignments", Some(request)).await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, patient) = send(&app, "GET", "/patients/P002", None).await;
        assert_eq!(patient["status"], json!("admitted"));
        assert_eq!(patient["bed"], json!("A-202-2"));
    }

    #[tokio::test]
    async fn unknown_labels_are_unprocessable() {
        let (app, _) = app();
        let request = json!({
            "patient": "P002",
            "room": "A-202",
            "bed": "A-202-2",
            "assignment_type": "walk-in",
            "actor": "N001",
        });
        let (status, _) = send(&app, "POST", "/assignments", Some(request)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn transfer_and_confirm() {
        let (app, _) = app();
        let request = json!({
            "patient": "P001",
            "room": "A-102",
            "reason": "bed-availability",
            "transfer_type": "internal",
            "urgency": "routine",
            "requested_by": "D001",
        });
        let (status, body) = send(&app, "POST", "/transfers", Some(request)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], json!("pending"));
        assert_eq!(body["transfer"]["to"]["bed"], json!("A-102-1"));
        let id = body["transfer"]["id"].as_str().unwrap().to_owned();

        let uri = format!("/transfers/{id}/complete");
        let (status, _) = send(&app, "POST", &uri, Some(json!({"actor": "N001"}))).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "POST", &uri, Some(json!({"actor": "N001"}))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, body) = send(&app, "GET", &format!("/transfers/{id}"), None).await;
        assert_eq!(body["status"], json!("completed"));
    }

    #[tokio::test]
    async fn discharge_requires_the_checklist() {
        let (app, _) = app();
        let mut request = json!({
            "patient": "P001",
            "discharge_type": "routine",
            "destination": "home",
            "physician": "D001",
            "final_diagnosis": "Stable angina",
            "checklist": {
                "patient_education": true,
                "medication_reconciliation": true,
            },
        });
        let (status, body) = send(&app, "POST", "/discharges", Some(request.clone())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("summary-provided"));

        request["checklist"]["summary_provided"] = json!(true);
        let (status, _) = send(&app, "POST", "/discharges", Some(request)).await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, room) = send(&app, "GET", "/rooms/A-101", None).await;
        assert_eq!(room["status"], json!("available"));
    }

    #[tokio::test]
    async fn vitals_are_charted_newest_first() {
        let (app, _) = app();
        for heart_rate in [72, 130] {
            let request = json!({
                "recorder": "N001",
                "payload": { "heart_rate": heart_rate },
            });
            let (status, _) = send(&app, "POST", "/patients/P001/vitals", Some(request)).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, chart) = send(&app, "GET", "/patients/P001/vitals", None).await;
        assert_eq!(status, StatusCode::OK);
        let chart = chart.as_array().unwrap();
        assert_eq!(chart.len(), 2);
        assert_eq!(chart[0]["payload"]["heart_rate"], json!(130));
        assert_eq!(chart[0]["flags"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn census_counts_every_room() {
        let (app, _) = app();
        let (status, body) = send(&app, "GET", "/census", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rooms"], json!(28));
        assert_eq!(body["maintenance"], json!(2));
        assert_eq!(body["cleaning"], json!(1));
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let (app, _) = app();
        let (status, body) = send(&app, "GET", "/api-docs/openapi.json", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/assignments"].is_object());
    }
}
