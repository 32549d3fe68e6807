//! Route table for the nested resources.
//!
//! Paths keep their trailing slash; `/offices` and `/offices/` are different
//! routes and only the latter exists.
use crate::api::error::{api_not_found, ApiError};
use crate::api::{beneficiaries, offices, plans, programs, records, users, AppState};
use crate::serializers::UrlBuilder;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

const OFFICE: &str = "/offices/:office_pk/";
const PROGRAM: &str = "/offices/:office_pk/programs/:program_pk/";
const PLAN: &str = "/offices/:office_pk/programs/:program_pk/plans/:plan_pk/";

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
            )
        });

    Router::new()
        .route("/", get(api_root))
        .route(
            "/offices/",
            get(offices::list_offices).post(offices::create_office),
        )
        .route(
            OFFICE,
            get(offices::retrieve_office)
                .put(offices::update_office)
                .patch(offices::partial_update_office)
                .delete(offices::destroy_office),
        )
        .route(
            &format!("{OFFICE}programs/"),
            get(programs::list_programs).post(programs::create_program),
        )
        .route(
            PROGRAM,
            get(programs::retrieve_program)
                .put(programs::update_program)
                .patch(programs::partial_update_program)
                .delete(programs::destroy_program),
        )
        .route(
            &format!("{PROGRAM}plans/"),
            get(plans::list_plans).post(plans::create_plan),
        )
        .route(
            PLAN,
            get(plans::retrieve_plan)
                .put(plans::update_plan)
                .patch(plans::partial_update_plan)
                .delete(plans::destroy_plan),
        )
        .route(&format!("{PLAN}approve/"), get(plans::approve_plan))
        .route(
            &format!("{PLAN}records/"),
            get(records::list_records).post(records::create_record),
        )
        .route(
            &format!("{PLAN}records/:record_pk/"),
            get(records::retrieve_record)
                .put(records::update_record)
                .patch(records::partial_update_record)
                .delete(records::destroy_record),
        )
        .route(
            &format!("{PROGRAM}beneficiaries/"),
            get(beneficiaries::list_beneficiaries).post(beneficiaries::create_beneficiary),
        )
        .route(
            &format!("{PROGRAM}beneficiaries/:beneficiary_pk/"),
            get(beneficiaries::retrieve_beneficiary)
                .put(beneficiaries::update_beneficiary)
                .patch(beneficiaries::partial_update_beneficiary)
                .delete(beneficiaries::destroy_beneficiary),
        )
        .route("/users/", get(users::list_users))
        .route("/users/:user_pk/", get(users::retrieve_user))
        .fallback(not_found)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET / - top-level collections
async fn api_root(urls: UrlBuilder) -> Json<Value> {
    Json(json!({
        "offices": urls.offices(),
        "users": urls.users(),
    }))
}

async fn not_found() -> ApiError {
    api_not_found()
}
