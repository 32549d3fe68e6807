//! Office controller: `/offices/` and `/offices/{office_pk}/`.
//!
//! Only allow-listed offices are visible; anything else is a 404 before the
//! instance gate is even consulted.
use crate::api::context::{authorize, read_payload, PathIds};
use crate::api::error::{api_internal, api_not_found, api_validation_error, ApiError};
use crate::api::AppState;
use crate::entities::{office, Office};
use crate::permissions::{Caller, Target, PERM_AA};
use crate::serializers::{required, NameInput, OfficeView, UrlBuilder};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

const PERMISSIONS: &[&str] = &[PERM_AA];

fn find_office(state: &AppState, office_id: i64) -> Result<Office, ApiError> {
    if !state.policy.allowed_offices.contains(&office_id) {
        return Err(api_not_found());
    }
    state
        .store
        .with_conn(|conn| office::get_office(conn, office_id))
        .map_err(|err| api_internal("failed to load office", &err))?
        .ok_or_else(api_not_found)
}

pub(crate) async fn list_offices(
    State(state): State<AppState>,
    caller: Caller,
    urls: UrlBuilder,
) -> Result<Json<Vec<OfficeView>>, ApiError> {
    authorize(&state, &caller, PERMISSIONS, None)?;
    let offices = state
        .store
        .with_conn(|conn| office::list_offices_in(conn, &state.policy.allowed_offices))
        .map_err(|err| api_internal("failed to list offices", &err))?;
    Ok(Json(offices.iter().map(|o| OfficeView::new(&urls, o)).collect()))
}

pub(crate) async fn create_office(
    State(state): State<AppState>,
    caller: Caller,
    urls: UrlBuilder,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<OfficeView>), ApiError> {
    authorize(&state, &caller, PERMISSIONS, None)?;
    let input = NameInput::parse(&read_payload(payload)?, false).map_err(api_validation_error)?;
    let name = required(input.name, "name").map_err(api_validation_error)?;

    let office = state
        .store
        .with_conn(|conn| office::insert_office(conn, &name))
        .map_err(|err| api_internal("failed to create office", &err))?;
    tracing::info!(office_id = office.id, "office created");

    Ok((StatusCode::CREATED, Json(OfficeView::new(&urls, &office))))
}

pub(crate) async fn retrieve_office(
    State(state): State<AppState>,
    caller: Caller,
    urls: UrlBuilder,
    ids: PathIds,
) -> Result<Json<OfficeView>, ApiError> {
    authorize(&state, &caller, PERMISSIONS, None)?;
    let office = find_office(&state, ids.pk("office_pk")?)?;
    authorize(&state, &caller, PERMISSIONS, Some(Target::Office(office.id)))?;
    Ok(Json(OfficeView::new(&urls, &office)))
}

pub(crate) async fn update_office(
    State(state): State<AppState>,
    caller: Caller,
    urls: UrlBuilder,
    ids: PathIds,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<OfficeView>, ApiError> {
    write_office(&state, &caller, &urls, &ids, payload, false)
}

pub(crate) async fn partial_update_office(
    State(state): State<AppState>,
    caller: Caller,
    urls: UrlBuilder,
    ids: PathIds,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<OfficeView>, ApiError> {
    write_office(&state, &caller, &urls, &ids, payload, true)
}

fn write_office(
    state: &AppState,
    caller: &Caller,
    urls: &UrlBuilder,
    ids: &PathIds,
    payload: Result<Json<Value>, JsonRejection>,
    partial: bool,
) -> Result<Json<OfficeView>, ApiError> {
    authorize(state, caller, PERMISSIONS, None)?;
    let mut office = find_office(state, ids.pk("office_pk")?)?;
    authorize(state, caller, PERMISSIONS, Some(Target::Office(office.id)))?;

    let input = NameInput::parse(&read_payload(payload)?, partial).map_err(api_validation_error)?;
    if let Some(name) = input.name {
        state
            .store
            .with_conn(|conn| office::rename_office(conn, office.id, &name))
            .map_err(|err| api_internal("failed to update office", &err))?;
        office.name = name;
    }

    Ok(Json(OfficeView::new(urls, &office)))
}

pub(crate) async fn destroy_office(
    State(state): State<AppState>,
    caller: Caller,
    ids: PathIds,
) -> Result<StatusCode, ApiError> {
    authorize(&state, &caller, PERMISSIONS, None)?;
    let office = find_office(&state, ids.pk("office_pk")?)?;
    authorize(&state, &caller, PERMISSIONS, Some(Target::Office(office.id)))?;

    state
        .store
        .with_conn(|conn| office::delete_office(conn, office.id))
        .map_err(|err| api_internal("failed to delete office", &err))?;
    tracing::info!(office_id = office.id, "office deleted with its programs");

    Ok(StatusCode::NO_CONTENT)
}
