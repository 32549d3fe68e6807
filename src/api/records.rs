//! Record controller: `.../plans/{plan_pk}/records/...`.
//!
//! The plan segment is resolved inside the program before anything else, so
//! a plan from another program is a 404 on every route here, create
//! included. Instance checks go to the plan's program.
use crate::api::context::{authorize, read_payload, PathIds, PlanScope};
use crate::api::error::{api_internal, api_not_found, api_validation_error, ApiError};
use crate::api::AppState;
use crate::entities::{beneficiary, record, Record};
use crate::permissions::{Caller, Target, PERM_AA};
use crate::serializers::{missing_pk, required, RecordInput, RecordView, UrlBuilder};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

const PERMISSIONS: &[&str] = &[PERM_AA];

fn find_record(state: &AppState, scope: &PlanScope, record_id: i64) -> Result<Record, ApiError> {
    state
        .store
        .with_conn(|conn| {
            record::get_record_in_plan(conn, scope.program.id, scope.plan.id, record_id)
        })
        .map_err(|err| api_internal("failed to load record", &err))?
        .ok_or_else(api_not_found)
}

/// A record may only reference beneficiaries of its own program
fn check_beneficiary(state: &AppState, scope: &PlanScope, beneficiary_id: i64) -> Result<(), ApiError> {
    let found = state
        .store
        .with_conn(|conn| {
            beneficiary::get_beneficiary_in_program(conn, scope.program.id, beneficiary_id)
        })
        .map_err(|err| api_internal("failed to load beneficiary", &err))?;

    match found {
        Some(_) => Ok(()),
        None => Err(api_validation_error(missing_pk("beneficiary", beneficiary_id))),
    }
}

fn view(urls: &UrlBuilder, scope: &PlanScope, record: &Record) -> RecordView {
    RecordView::new(urls, scope.office_id, scope.program.id, record)
}

fn record_target(scope: &PlanScope) -> Option<Target> {
    Some(Target::Program(scope.plan.program_id))
}

pub(crate) async fn list_records(
    State(state): State<AppState>,
    caller: Caller,
    urls: UrlBuilder,
    scope: PlanScope,
) -> Result<Json<Vec<RecordView>>, ApiError> {
    authorize(&state, &caller, PERMISSIONS, None)?;
    let records = state
        .store
        .with_conn(|conn| record::list_records(conn, scope.program.id, scope.plan.id))
        .map_err(|err| api_internal("failed to list records", &err))?;
    Ok(Json(records.iter().map(|r| view(&urls, &scope, r)).collect()))
}

pub(crate) async fn create_record(
    State(state): State<AppState>,
    caller: Caller,
    urls: UrlBuilder,
    scope: PlanScope,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<RecordView>), ApiError> {
    authorize(&state, &caller, PERMISSIONS, None)?;
    let input = RecordInput::parse(&read_payload(payload)?, false).map_err(api_validation_error)?;
    let name = required(input.name, "name").map_err(api_validation_error)?;
    let beneficiary_id = required(input.beneficiary, "beneficiary").map_err(api_validation_error)?;
    check_beneficiary(&state, &scope, beneficiary_id)?;

    let created = state
        .store
        .with_conn(|conn| record::insert_record(conn, scope.plan.id, beneficiary_id, &name))
        .map_err(|err| api_internal("failed to create record", &err))?;
    tracing::info!(plan_id = scope.plan.id, record_id = created.id, "record created");

    Ok((StatusCode::CREATED, Json(view(&urls, &scope, &created))))
}

pub(crate) async fn retrieve_record(
    State(state): State<AppState>,
    caller: Caller,
    urls: UrlBuilder,
    scope: PlanScope,
    ids: PathIds,
) -> Result<Json<RecordView>, ApiError> {
    authorize(&state, &caller, PERMISSIONS, None)?;
    let found = find_record(&state, &scope, ids.pk("record_pk")?)?;
    authorize(&state, &caller, PERMISSIONS, record_target(&scope))?;
    Ok(Json(view(&urls, &scope, &found)))
}

pub(crate) async fn update_record(
    State(state): State<AppState>,
    caller: Caller,
    urls: UrlBuilder,
    scope: PlanScope,
    ids: PathIds,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<RecordView>, ApiError> {
    write_record(&state, &caller, &urls, &scope, &ids, payload, false)
}

pub(crate) async fn partial_update_record(
    State(state): State<AppState>,
    caller: Caller,
    urls: UrlBuilder,
    scope: PlanScope,
    ids: PathIds,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<RecordView>, ApiError> {
    write_record(&state, &caller, &urls, &scope, &ids, payload, true)
}

fn write_record(
    state: &AppState,
    caller: &Caller,
    urls: &UrlBuilder,
    scope: &PlanScope,
    ids: &PathIds,
    payload: Result<Json<Value>, JsonRejection>,
    partial: bool,
) -> Result<Json<RecordView>, ApiError> {
    authorize(state, caller, PERMISSIONS, None)?;
    let mut found = find_record(state, scope, ids.pk("record_pk")?)?;
    authorize(state, caller, PERMISSIONS, record_target(scope))?;

    let input = RecordInput::parse(&read_payload(payload)?, partial).map_err(api_validation_error)?;
    if let Some(beneficiary_id) = input.beneficiary {
        check_beneficiary(state, scope, beneficiary_id)?;
        found.beneficiary_id = beneficiary_id;
    }
    if let Some(name) = input.name {
        found.name = name;
    }

    state
        .store
        .with_conn(|conn| record::update_record(conn, found.id, found.beneficiary_id, &found.name))
        .map_err(|err| api_internal("failed to update record", &err))?;

    Ok(Json(view(urls, scope, &found)))
}

pub(crate) async fn destroy_record(
    State(state): State<AppState>,
    caller: Caller,
    scope: PlanScope,
    ids: PathIds,
) -> Result<StatusCode, ApiError> {
    authorize(&state, &caller, PERMISSIONS, None)?;
    let found = find_record(&state, &scope, ids.pk("record_pk")?)?;
    authorize(&state, &caller, PERMISSIONS, record_target(&scope))?;

    state
        .store
        .with_conn(|conn| record::delete_record(conn, found.id))
        .map_err(|err| api_internal("failed to delete record", &err))?;
    tracing::info!(record_id = found.id, "record deleted");

    Ok(StatusCode::NO_CONTENT)
}
