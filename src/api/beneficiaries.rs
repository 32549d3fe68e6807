//! Beneficiary controller: `/offices/{office_pk}/programs/{program_pk}/beneficiaries/...`.
//!
//! Gated like plans: instance checks go to the owning program.
use crate::api::context::{authorize, read_payload, PathIds, ProgramScope};
use crate::api::error::{api_internal, api_not_found, api_validation_error, ApiError};
use crate::api::AppState;
use crate::entities::{beneficiary, Beneficiary};
use crate::permissions::{Caller, Target, PERM_AA};
use crate::serializers::{required, BeneficiaryView, NameInput, UrlBuilder};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

const PERMISSIONS: &[&str] = &[PERM_AA];

fn find_beneficiary(
    state: &AppState,
    scope: &ProgramScope,
    beneficiary_id: i64,
) -> Result<Beneficiary, ApiError> {
    state
        .store
        .with_conn(|conn| {
            beneficiary::get_beneficiary_in_program(conn, scope.program.id, beneficiary_id)
        })
        .map_err(|err| api_internal("failed to load beneficiary", &err))?
        .ok_or_else(api_not_found)
}

pub(crate) async fn list_beneficiaries(
    State(state): State<AppState>,
    caller: Caller,
    urls: UrlBuilder,
    scope: ProgramScope,
) -> Result<Json<Vec<BeneficiaryView>>, ApiError> {
    authorize(&state, &caller, PERMISSIONS, None)?;
    let beneficiaries = state
        .store
        .with_conn(|conn| beneficiary::list_beneficiaries(conn, scope.program.id))
        .map_err(|err| api_internal("failed to list beneficiaries", &err))?;
    Ok(Json(
        beneficiaries
            .iter()
            .map(|b| BeneficiaryView::new(&urls, scope.office_id, b))
            .collect(),
    ))
}

pub(crate) async fn create_beneficiary(
    State(state): State<AppState>,
    caller: Caller,
    urls: UrlBuilder,
    scope: ProgramScope,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<BeneficiaryView>), ApiError> {
    authorize(&state, &caller, PERMISSIONS, None)?;
    let input = NameInput::parse(&read_payload(payload)?, false).map_err(api_validation_error)?;
    let name = required(input.name, "name").map_err(api_validation_error)?;

    let created = state
        .store
        .with_conn(|conn| beneficiary::insert_beneficiary(conn, scope.program.id, &name))
        .map_err(|err| api_internal("failed to create beneficiary", &err))?;
    tracing::info!(
        program_id = scope.program.id,
        beneficiary_id = created.id,
        "beneficiary created"
    );

    Ok((
        StatusCode::CREATED,
        Json(BeneficiaryView::new(&urls, scope.office_id, &created)),
    ))
}

pub(crate) async fn retrieve_beneficiary(
    State(state): State<AppState>,
    caller: Caller,
    urls: UrlBuilder,
    scope: ProgramScope,
    ids: PathIds,
) -> Result<Json<BeneficiaryView>, ApiError> {
    authorize(&state, &caller, PERMISSIONS, None)?;
    let found = find_beneficiary(&state, &scope, ids.pk("beneficiary_pk")?)?;
    authorize(&state, &caller, PERMISSIONS, Some(Target::Program(found.program_id)))?;
    Ok(Json(BeneficiaryView::new(&urls, scope.office_id, &found)))
}

pub(crate) async fn update_beneficiary(
    State(state): State<AppState>,
    caller: Caller,
    urls: UrlBuilder,
    scope: ProgramScope,
    ids: PathIds,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BeneficiaryView>, ApiError> {
    write_beneficiary(&state, &caller, &urls, &scope, &ids, payload, false)
}

pub(crate) async fn partial_update_beneficiary(
    State(state): State<AppState>,
    caller: Caller,
    urls: UrlBuilder,
    scope: ProgramScope,
    ids: PathIds,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BeneficiaryView>, ApiError> {
    write_beneficiary(&state, &caller, &urls, &scope, &ids, payload, true)
}

fn write_beneficiary(
    state: &AppState,
    caller: &Caller,
    urls: &UrlBuilder,
    scope: &ProgramScope,
    ids: &PathIds,
    payload: Result<Json<Value>, JsonRejection>,
    partial: bool,
) -> Result<Json<BeneficiaryView>, ApiError> {
    authorize(state, caller, PERMISSIONS, None)?;
    let mut found = find_beneficiary(state, scope, ids.pk("beneficiary_pk")?)?;
    authorize(state, caller, PERMISSIONS, Some(Target::Program(found.program_id)))?;

    let input = NameInput::parse(&read_payload(payload)?, partial).map_err(api_validation_error)?;
    if let Some(name) = input.name {
        state
            .store
            .with_conn(|conn| beneficiary::rename_beneficiary(conn, found.id, &name))
            .map_err(|err| api_internal("failed to update beneficiary", &err))?;
        found.name = name;
    }

    Ok(Json(BeneficiaryView::new(urls, scope.office_id, &found)))
}

pub(crate) async fn destroy_beneficiary(
    State(state): State<AppState>,
    caller: Caller,
    scope: ProgramScope,
    ids: PathIds,
) -> Result<StatusCode, ApiError> {
    authorize(&state, &caller, PERMISSIONS, None)?;
    let found = find_beneficiary(&state, &scope, ids.pk("beneficiary_pk")?)?;
    authorize(&state, &caller, PERMISSIONS, Some(Target::Program(found.program_id)))?;

    state
        .store
        .with_conn(|conn| beneficiary::delete_beneficiary(conn, found.id))
        .map_err(|err| api_internal("failed to delete beneficiary", &err))?;
    tracing::info!(beneficiary_id = found.id, "beneficiary deleted with its records");

    Ok(StatusCode::NO_CONTENT)
}
