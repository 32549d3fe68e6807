#![allow(dead_code)]

use axum::body::Body;
use axum::http::Request;
use chrono::{TimeZone, Utc};
use office_api::api::router::build_router;
use office_api::api::AppState;
use office_api::entities::{beneficiary, office, plan, program, record, user};
use office_api::{AccessPolicy, Store};

pub type App = axum::routing::RouterIntoService<Body, ()>;

/// Fixture hierarchy; ids are assigned in insertion order.
///
/// ```text
/// office 1 Head      programs 1 Food, 2 Water, 4 Health (not allow-listed)
/// office 2 Regional  program  3 Education
/// office 3 Field     (not allow-listed)
/// plans    1..=4, one per program, same id as its program
/// benefs   1 (program 1), 2 (program 2)
/// records  1 (plan 1, beneficiary 1)
/// ```
pub fn seeded_store() -> Store {
    let store = Store::open_in_memory().expect("store");
    store
        .with_conn(|conn| {
            let head = office::insert_office(conn, "Head Office")?;
            let regional = office::insert_office(conn, "Regional Office")?;
            office::insert_office(conn, "Field Office")?;

            let food = program::insert_program(conn, head.id, "Food Security")?;
            let water = program::insert_program(conn, head.id, "Clean Water")?;
            let education = program::insert_program(conn, regional.id, "Education")?;
            let health = program::insert_program(conn, head.id, "Health")?;

            let q1 = plan::insert_plan(conn, food.id, "Q1 Distribution")?;
            plan::insert_plan(conn, water.id, "Wells")?;
            plan::insert_plan(conn, education.id, "Schools")?;
            plan::insert_plan(conn, health.id, "Clinics")?;

            let ana = beneficiary::insert_beneficiary(conn, food.id, "Ana")?;
            beneficiary::insert_beneficiary(conn, water.id, "Ben")?;
            record::insert_record(conn, q1.id, ana.id, "January visit")?;

            user::insert_user(
                conn,
                "early",
                "early@example.org",
                Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            )?;
            user::insert_user(
                conn,
                "late",
                "late@example.org",
                Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
            )?;
            Ok(())
        })
        .expect("seed");
    store
}

pub fn seeded_state() -> AppState {
    AppState::new(seeded_store(), AccessPolicy::default())
}

pub fn app_for(state: AppState) -> App {
    build_router(state).into_service()
}

pub fn seeded_app() -> App {
    app_for(seeded_state())
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}
