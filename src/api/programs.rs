//! Program controller: `/offices/{office_pk}/programs/...`.
use crate::api::context::{authorize, read_payload, OfficeScope, PathIds};
use crate::api::error::{api_internal, api_not_found, api_validation_error, ApiError};
use crate::api::AppState;
use crate::entities::{program, Program};
use crate::permissions::{Caller, Target, PERM_AA};
use crate::serializers::{required, NameInput, ProgramView, UrlBuilder};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

const PERMISSIONS: &[&str] = &[PERM_AA];

/// Lookup within the office's allow-listed programs
fn find_program(state: &AppState, office_id: i64, program_id: i64) -> Result<Program, ApiError> {
    if !state.policy.allowed_programs.contains(&program_id) {
        return Err(api_not_found());
    }
    state
        .store
        .with_conn(|conn| program::get_program_in_office(conn, office_id, program_id))
        .map_err(|err| api_internal("failed to load program", &err))?
        .ok_or_else(api_not_found)
}

pub(crate) async fn list_programs(
    State(state): State<AppState>,
    caller: Caller,
    urls: UrlBuilder,
    scope: OfficeScope,
) -> Result<Json<Vec<ProgramView>>, ApiError> {
    authorize(&state, &caller, PERMISSIONS, None)?;
    let programs = state
        .store
        .with_conn(|conn| {
            program::list_programs_in(conn, scope.office.id, &state.policy.allowed_programs)
        })
        .map_err(|err| api_internal("failed to list programs", &err))?;
    Ok(Json(programs.iter().map(|p| ProgramView::new(&urls, p)).collect()))
}

pub(crate) async fn create_program(
    State(state): State<AppState>,
    caller: Caller,
    urls: UrlBuilder,
    scope: OfficeScope,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<ProgramView>), ApiError> {
    authorize(&state, &caller, PERMISSIONS, None)?;
    let input = NameInput::parse(&read_payload(payload)?, false).map_err(api_validation_error)?;
    let name = required(input.name, "name").map_err(api_validation_error)?;

    let program = state
        .store
        .with_conn(|conn| program::insert_program(conn, scope.office.id, &name))
        .map_err(|err| api_internal("failed to create program", &err))?;
    tracing::info!(office_id = scope.office.id, program_id = program.id, "program created");

    Ok((StatusCode::CREATED, Json(ProgramView::new(&urls, &program))))
}

pub(crate) async fn retrieve_program(
    State(state): State<AppState>,
    caller: Caller,
    urls: UrlBuilder,
    scope: OfficeScope,
    ids: PathIds,
) -> Result<Json<ProgramView>, ApiError> {
    authorize(&state, &caller, PERMISSIONS, None)?;
    let program = find_program(&state, scope.office.id, ids.pk("program_pk")?)?;
    authorize(&state, &caller, PERMISSIONS, Some(Target::Program(program.id)))?;
    Ok(Json(ProgramView::new(&urls, &program)))
}

pub(crate) async fn update_program(
    State(state): State<AppState>,
    caller: Caller,
    urls: UrlBuilder,
    scope: OfficeScope,
    ids: PathIds,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ProgramView>, ApiError> {
    write_program(&state, &caller, &urls, &scope, &ids, payload, false)
}

pub(crate) async fn partial_update_program(
    State(state): State<AppState>,
    caller: Caller,
    urls: UrlBuilder,
    scope: OfficeScope,
    ids: PathIds,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ProgramView>, ApiError> {
    write_program(&state, &caller, &urls, &scope, &ids, payload, true)
}

fn write_program(
    state: &AppState,
    caller: &Caller,
    urls: &UrlBuilder,
    scope: &OfficeScope,
    ids: &PathIds,
    payload: Result<Json<Value>, JsonRejection>,
    partial: bool,
) -> Result<Json<ProgramView>, ApiError> {
    authorize(state, caller, PERMISSIONS, None)?;
    let mut program = find_program(state, scope.office.id, ids.pk("program_pk")?)?;
    authorize(state, caller, PERMISSIONS, Some(Target::Program(program.id)))?;

    let input = NameInput::parse(&read_payload(payload)?, partial).map_err(api_validation_error)?;
    if let Some(name) = input.name {
        state
            .store
            .with_conn(|conn| program::rename_program(conn, program.id, &name))
            .map_err(|err| api_internal("failed to update program", &err))?;
        program.name = name;
    }

    Ok(Json(ProgramView::new(urls, &program)))
}

pub(crate) async fn destroy_program(
    State(state): State<AppState>,
    caller: Caller,
    scope: OfficeScope,
    ids: PathIds,
) -> Result<StatusCode, ApiError> {
    authorize(&state, &caller, PERMISSIONS, None)?;
    let program = find_program(&state, scope.office.id, ids.pk("program_pk")?)?;
    authorize(&state, &caller, PERMISSIONS, Some(Target::Program(program.id)))?;

    state
        .store
        .with_conn(|conn| program::delete_program(conn, program.id))
        .map_err(|err| api_internal("failed to delete program", &err))?;
    tracing::info!(program_id = program.id, "program deleted");

    Ok(StatusCode::NO_CONTENT)
}
