#![cfg(feature = "server")]

mod common;

use axum::http::{Request, StatusCode};
use common::{empty_request, json_request, read_json, seeded_app, seeded_state, app_for};
use office_api::entities::{plan, program, record};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn api_root_lists_top_level_collections() {
    let app = seeded_app();

    let response = app.oneshot(empty_request("GET", "/")).await.expect("root");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["offices"], "/offices/");
    assert_eq!(payload["users"], "/users/");
}

#[tokio::test]
async fn offices_list_only_allow_listed() {
    let app = seeded_app();

    let response = app
        .oneshot(empty_request("GET", "/offices/"))
        .await
        .expect("list");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    let pks: Vec<i64> = payload
        .as_array()
        .unwrap()
        .iter()
        .map(|office| office["pk"].as_i64().unwrap())
        .collect();
    assert_eq!(pks, vec![1, 2]);
    assert_eq!(payload[0]["url"], "/offices/1/");
    assert_eq!(payload[0]["programs"], "/offices/1/programs/");
}

#[tokio::test]
async fn host_header_makes_urls_absolute() {
    let app = seeded_app();

    let request = Request::builder()
        .uri("/offices/1/")
        .header("host", "api.example.org")
        .body(axum::body::Body::empty())
        .expect("get");
    let response = app.oneshot(request).await.expect("get");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["url"], "http://api.example.org/offices/1/");
    assert_eq!(payload["name"], "Head Office");
}

#[tokio::test]
async fn office_crud_smoke() {
    let app = seeded_app();

    let response = app
        .clone()
        .oneshot(json_request("POST", "/offices/", json!({ "name": "  Annex  " })))
        .await
        .expect("create");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json(response).await;
    assert_eq!(created["pk"], 4);
    assert_eq!(created["name"], "Annex");

    // Created, but outside the allow-list.
    let response = app
        .clone()
        .oneshot(empty_request("GET", "/offices/4/"))
        .await
        .expect("get");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(json_request("PATCH", "/offices/2/", json!({ "name": "Regional HQ" })))
        .await
        .expect("patch");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["name"], "Regional HQ");

    let response = app
        .clone()
        .oneshot(json_request("PUT", "/offices/2/", json!({})))
        .await
        .expect("put");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json(response).await;
    assert_eq!(payload["code"], "validation_error");
    assert_eq!(payload["fields"]["name"][0], "This field is required.");

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/offices/2/"))
        .await
        .expect("delete");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(empty_request("GET", "/offices/2/"))
        .await
        .expect("get after delete");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_office_cascades_to_descendants() {
    let state = seeded_state();
    let store = state.store.clone();
    let app = app_for(state);

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/offices/1/"))
        .await
        .expect("delete");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(empty_request("GET", "/offices/1/programs/1/plans/1/"))
        .await
        .expect("plan after delete");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let (programs, plans, records) = store
        .with_conn(|conn| {
            Ok((
                program::get_program(conn, 1)?,
                plan::list_plans(conn, 1)?,
                record::list_records(conn, 1, 1)?,
            ))
        })
        .expect("lookup");
    assert!(programs.is_none());
    assert!(plans.is_empty());
    assert!(records.is_empty());
}

#[tokio::test]
async fn plan_create_then_retrieve_round_trips() {
    let app = seeded_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/offices/1/programs/1/plans/",
            json!({ "name": "Q2 Distribution" }),
        ))
        .await
        .expect("create");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json(response).await;
    let pk = created["pk"].as_i64().unwrap();
    assert_eq!(created["program"]["id"], 1);
    assert_eq!(created["program"]["url"], "/offices/1/programs/1/");
    assert_eq!(
        created["records"],
        format!("/offices/1/programs/1/plans/{pk}/records/")
    );

    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/offices/1/programs/1/plans/{pk}/")))
        .await
        .expect("get");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, created);

    let response = app
        .oneshot(json_request(
            "PATCH",
            &format!("/offices/1/programs/1/plans/{pk}/"),
            json!({}),
        ))
        .await
        .expect("empty patch");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["name"], "Q2 Distribution");
}

#[tokio::test]
async fn records_are_listed_per_plan() {
    let app = seeded_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/offices/1/programs/1/plans/",
            json!({ "name": "Q2 Distribution" }),
        ))
        .await
        .expect("plan");
    let second_plan = read_json(response).await["pk"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/offices/1/programs/1/plans/{second_plan}/records/"),
            json!({ "name": "April visit", "beneficiary": 1 }),
        ))
        .await
        .expect("record");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json(response).await;
    assert_eq!(created["plan"]["id"], second_plan);
    assert_eq!(created["beneficiary"]["url"], "/offices/1/programs/1/beneficiaries/1/");

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/offices/1/programs/1/plans/1/records/"))
        .await
        .expect("list first");
    let first = read_json(response).await;
    assert_eq!(first.as_array().unwrap().len(), 1);
    assert_eq!(first[0]["name"], "January visit");

    let response = app
        .oneshot(empty_request(
            "GET",
            &format!("/offices/1/programs/1/plans/{second_plan}/records/"),
        ))
        .await
        .expect("list second");
    let second = read_json(response).await;
    assert_eq!(second.as_array().unwrap().len(), 1);
    assert_eq!(second[0]["name"], "April visit");
}

#[tokio::test]
async fn record_under_foreign_plan_is_not_found() {
    let app = seeded_app();

    // Plan 2 belongs to program 2.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/offices/1/programs/1/plans/2/records/",
            json!({ "name": "Misfiled", "beneficiary": 1 }),
        ))
        .await
        .expect("create");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(response).await["code"], "not_found");

    let response = app
        .oneshot(empty_request("GET", "/offices/1/programs/1/plans/2/records/1/"))
        .await
        .expect("get");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn record_rejects_beneficiary_from_other_program() {
    let app = seeded_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/offices/1/programs/1/plans/1/records/",
            json!({ "name": "Wrong person", "beneficiary": 2 }),
        ))
        .await
        .expect("create");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json(response).await;
    assert_eq!(
        payload["fields"]["beneficiary"][0],
        "Invalid pk \"2\" - object does not exist."
    );

    let response = app
        .oneshot(json_request(
            "PATCH",
            "/offices/1/programs/1/plans/1/records/1/",
            json!({ "beneficiary": "x" }),
        ))
        .await
        .expect("patch");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json(response).await;
    assert_eq!(
        payload["fields"]["beneficiary"][0],
        "Incorrect type. Expected pk value, received str."
    );
}

#[tokio::test]
async fn beneficiary_crud_smoke() {
    let app = seeded_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/offices/1/programs/1/beneficiaries/",
            json!({ "name": "Caro" }),
        ))
        .await
        .expect("create");
    assert_eq!(response.status(), StatusCode::CREATED);
    let pk = read_json(response).await["pk"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/offices/1/programs/1/beneficiaries/"))
        .await
        .expect("list");
    assert_eq!(read_json(response).await.as_array().unwrap().len(), 2);

    let response = app
        .clone()
        .oneshot(empty_request(
            "DELETE",
            &format!("/offices/1/programs/1/beneficiaries/{pk}/"),
        ))
        .await
        .expect("delete");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Beneficiary 2 lives in program 2.
    let response = app
        .oneshot(empty_request("GET", "/offices/1/programs/1/beneficiaries/2/"))
        .await
        .expect("foreign");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn users_are_listed_newest_first() {
    let app = seeded_app();

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/users/"))
        .await
        .expect("list");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload[0]["username"], "late");
    assert_eq!(payload[1]["username"], "early");
    assert_eq!(payload[1]["url"], "/users/1/");

    let response = app
        .oneshot(empty_request("GET", "/users/9/"))
        .await
        .expect("missing");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_routes_and_bad_ids_are_json_404() {
    let app = seeded_app();

    for uri in ["/offices", "/offices/abc/", "/offices/1/programs/xyz/plans/"] {
        let response = app
            .clone()
            .oneshot(empty_request("GET", uri))
            .await
            .expect("get");
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(read_json(response).await["code"], "not_found", "{uri}");
    }
}

#[tokio::test]
async fn malformed_bodies_are_parse_errors() {
    let app = seeded_app();

    let request = Request::builder()
        .method("POST")
        .uri("/offices/")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{"))
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("malformed");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["code"], "parse_error");

    let request = Request::builder()
        .method("POST")
        .uri("/offices/")
        .body(axum::body::Body::from(r#"{"name":"x"}"#))
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("no content type");
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let response = app
        .oneshot(json_request("POST", "/offices/", json!(["name"])))
        .await
        .expect("array");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json(response).await;
    assert_eq!(
        payload["fields"]["non_field_errors"][0],
        "Invalid data. Expected a dictionary, but got list."
    );
}

#[tokio::test]
async fn record_writes_merge_with_stored_fields() {
    let app = seeded_app();
    let record_uri = "/offices/1/programs/1/plans/1/records/1/";

    let response = app
        .clone()
        .oneshot(json_request("PATCH", record_uri, json!({ "name": "Renamed" })))
        .await
        .expect("patch");
    assert_eq!(response.status(), StatusCode::OK);
    let patched = read_json(response).await;
    assert_eq!(patched["name"], "Renamed");
    assert_eq!(patched["beneficiary"]["id"], 1);

    let response = app
        .clone()
        .oneshot(empty_request("GET", record_uri))
        .await
        .expect("get after patch");
    assert_eq!(read_json(response).await, patched);

    let response = app
        .clone()
        .oneshot(json_request("PUT", record_uri, json!({ "name": "Only name" })))
        .await
        .expect("put without beneficiary");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json(response).await;
    assert_eq!(payload["fields"]["beneficiary"][0], "This field is required.");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/offices/1/programs/1/beneficiaries/",
            json!({ "name": "Caro" }),
        ))
        .await
        .expect("beneficiary");
    let caro = read_json(response).await["pk"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            record_uri,
            json!({ "name": "February visit", "beneficiary": caro }),
        ))
        .await
        .expect("put");
    assert_eq!(response.status(), StatusCode::OK);
    let replaced = read_json(response).await;
    assert_eq!(replaced["name"], "February visit");
    assert_eq!(replaced["beneficiary"]["id"], caro);

    let response = app
        .oneshot(empty_request("GET", record_uri))
        .await
        .expect("get after put");
    assert_eq!(read_json(response).await, replaced);
}

#[tokio::test]
async fn program_update_and_delete() {
    let app = seeded_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/offices/1/programs/2/",
            json!({ "name": "Water and Sanitation" }),
        ))
        .await
        .expect("put");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["name"], "Water and Sanitation");
    assert_eq!(payload["office"]["id"], 1);

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            "/offices/1/programs/1/plans/1/",
            json!({ "name": "Q1 Rations" }),
        ))
        .await
        .expect("patch plan");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["name"], "Q1 Rations");

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/offices/1/programs/1/"))
        .await
        .expect("delete");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    for uri in [
        "/offices/1/programs/1/",
        "/offices/1/programs/1/plans/",
        "/offices/1/programs/1/plans/1/records/",
    ] {
        let response = app
            .clone()
            .oneshot(empty_request("GET", uri))
            .await
            .expect("get after delete");
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }

    // The sibling program is untouched.
    let response = app
        .oneshot(empty_request("GET", "/offices/1/programs/"))
        .await
        .expect("list");
    let remaining = read_json(response).await;
    assert_eq!(remaining.as_array().unwrap().len(), 1);
    assert_eq!(remaining[0]["pk"], 2);
}

#[tokio::test]
async fn plan_and_record_delete() {
    let app = seeded_app();

    let response = app
        .clone()
        .oneshot(empty_request(
            "DELETE",
            "/offices/1/programs/1/plans/1/records/1/",
        ))
        .await
        .expect("delete record");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/offices/1/programs/1/plans/1/records/"))
        .await
        .expect("list records");
    assert!(read_json(response).await.as_array().unwrap().is_empty());

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/offices/1/programs/2/plans/2/"))
        .await
        .expect("delete plan");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(empty_request("GET", "/offices/1/programs/2/plans/2/"))
        .await
        .expect("get plan");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
