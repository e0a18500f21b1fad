use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use campus_core::health::{healthz, readyz};
use campus_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::domain::types::{Course, Enrollment, Student};
use crate::handlers::{
    enrollment::get_courses_of_student,
    profile::{get_me, register, update_me},
    records::{create_record, delete_record, get_record, list_records, update_record},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Courses
        .route("/api/courses", get(list_records::<Course>))
        .route("/api/courses", post(create_record::<Course>))
        .route("/api/courses/{id}", get(get_record::<Course>))
        .route("/api/courses/{id}", put(update_record::<Course>))
        .route("/api/courses/{id}", delete(delete_record::<Course>))
        // Students
        .route("/api/students", get(list_records::<Student>))
        .route("/api/students", post(create_record::<Student>))
        .route("/api/students/{id}", get(get_record::<Student>))
        .route("/api/students/{id}", put(update_record::<Student>))
        .route("/api/students/{id}", delete(delete_record::<Student>))
        // Enrollments
        .route("/api/enrollments", get(list_records::<Enrollment>))
        .route("/api/enrollments", post(create_record::<Enrollment>))
        .route("/api/enrollments/{id}", get(get_record::<Enrollment>))
        .route("/api/enrollments/{id}", put(update_record::<Enrollment>))
        .route("/api/enrollments/{id}", delete(delete_record::<Enrollment>))
        .route(
            "/api/enrollments/student/{student_id}",
            get(get_courses_of_student),
        )
        // Profile
        .route("/api/auth/register", post(register))
        .route("/api/profile/me", get(get_me))
        .route("/api/profile/me", put(update_me))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
}

/// CORS for the single configured frontend origin.
pub fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let origin: HeaderValue = origin.parse()?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true))
}
