//! Plan controller: `/offices/{office_pk}/programs/{program_pk}/plans/...`.
//!
//! Instance checks run against the plan's program, not the plan. The
//! `approve` action swaps the required permission for `"approve"`, which at
//! the instance level only the approver program grants.
use crate::api::context::{authorize, read_payload, PathIds, ProgramScope};
use crate::api::error::{api_internal, api_not_found, api_validation_error, ApiError};
use crate::api::AppState;
use crate::entities::{plan, Plan};
use crate::permissions::{Caller, Target, PERM_AA, PERM_APPROVE};
use crate::serializers::{required, NameInput, PlanView, UrlBuilder};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

const PERMISSIONS: &[&str] = &[PERM_AA];
const APPROVE_PERMISSIONS: &[&str] = &[PERM_APPROVE];

fn find_plan(state: &AppState, scope: &ProgramScope, plan_id: i64) -> Result<Plan, ApiError> {
    state
        .store
        .with_conn(|conn| plan::get_plan_in_program(conn, scope.program.id, plan_id))
        .map_err(|err| api_internal("failed to load plan", &err))?
        .ok_or_else(api_not_found)
}

fn plan_target(plan: &Plan) -> Option<Target> {
    Some(Target::Program(plan.program_id))
}

pub(crate) async fn list_plans(
    State(state): State<AppState>,
    caller: Caller,
    urls: UrlBuilder,
    scope: ProgramScope,
) -> Result<Json<Vec<PlanView>>, ApiError> {
    authorize(&state, &caller, PERMISSIONS, None)?;
    let plans = state
        .store
        .with_conn(|conn| plan::list_plans(conn, scope.program.id))
        .map_err(|err| api_internal("failed to list plans", &err))?;
    Ok(Json(
        plans
            .iter()
            .map(|p| PlanView::new(&urls, scope.office_id, p))
            .collect(),
    ))
}

pub(crate) async fn create_plan(
    State(state): State<AppState>,
    caller: Caller,
    urls: UrlBuilder,
    scope: ProgramScope,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<PlanView>), ApiError> {
    authorize(&state, &caller, PERMISSIONS, None)?;
    let input = NameInput::parse(&read_payload(payload)?, false).map_err(api_validation_error)?;
    let name = required(input.name, "name").map_err(api_validation_error)?;

    let plan = state
        .store
        .with_conn(|conn| plan::insert_plan(conn, scope.program.id, &name))
        .map_err(|err| api_internal("failed to create plan", &err))?;
    tracing::info!(program_id = scope.program.id, plan_id = plan.id, "plan created");

    Ok((
        StatusCode::CREATED,
        Json(PlanView::new(&urls, scope.office_id, &plan)),
    ))
}

pub(crate) async fn retrieve_plan(
    State(state): State<AppState>,
    caller: Caller,
    urls: UrlBuilder,
    scope: ProgramScope,
    ids: PathIds,
) -> Result<Json<PlanView>, ApiError> {
    authorize(&state, &caller, PERMISSIONS, None)?;
    let plan = find_plan(&state, &scope, ids.pk("plan_pk")?)?;
    authorize(&state, &caller, PERMISSIONS, plan_target(&plan))?;
    Ok(Json(PlanView::new(&urls, scope.office_id, &plan)))
}

pub(crate) async fn update_plan(
    State(state): State<AppState>,
    caller: Caller,
    urls: UrlBuilder,
    scope: ProgramScope,
    ids: PathIds,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PlanView>, ApiError> {
    write_plan(&state, &caller, &urls, &scope, &ids, payload, false)
}

pub(crate) async fn partial_update_plan(
    State(state): State<AppState>,
    caller: Caller,
    urls: UrlBuilder,
    scope: ProgramScope,
    ids: PathIds,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PlanView>, ApiError> {
    write_plan(&state, &caller, &urls, &scope, &ids, payload, true)
}

fn write_plan(
    state: &AppState,
    caller: &Caller,
    urls: &UrlBuilder,
    scope: &ProgramScope,
    ids: &PathIds,
    payload: Result<Json<Value>, JsonRejection>,
    partial: bool,
) -> Result<Json<PlanView>, ApiError> {
    authorize(state, caller, PERMISSIONS, None)?;
    let mut plan = find_plan(state, scope, ids.pk("plan_pk")?)?;
    authorize(state, caller, PERMISSIONS, plan_target(&plan))?;

    let input = NameInput::parse(&read_payload(payload)?, partial).map_err(api_validation_error)?;
    if let Some(name) = input.name {
        state
            .store
            .with_conn(|conn| plan::rename_plan(conn, plan.id, &name))
            .map_err(|err| api_internal("failed to update plan", &err))?;
        plan.name = name;
    }

    Ok(Json(PlanView::new(urls, scope.office_id, &plan)))
}

pub(crate) async fn destroy_plan(
    State(state): State<AppState>,
    caller: Caller,
    scope: ProgramScope,
    ids: PathIds,
) -> Result<StatusCode, ApiError> {
    authorize(&state, &caller, PERMISSIONS, None)?;
    let plan = find_plan(&state, &scope, ids.pk("plan_pk")?)?;
    authorize(&state, &caller, PERMISSIONS, plan_target(&plan))?;

    state
        .store
        .with_conn(|conn| plan::delete_plan(conn, plan.id))
        .map_err(|err| api_internal("failed to delete plan", &err))?;
    tracing::info!(plan_id = plan.id, "plan deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// GET .../plans/{plan_pk}/approve/
pub(crate) async fn approve_plan(
    State(state): State<AppState>,
    caller: Caller,
    scope: ProgramScope,
    ids: PathIds,
) -> Result<Json<Value>, ApiError> {
    authorize(&state, &caller, APPROVE_PERMISSIONS, None)?;
    let plan = find_plan(&state, &scope, ids.pk("plan_pk")?)?;
    authorize(&state, &caller, APPROVE_PERMISSIONS, plan_target(&plan))?;

    plan.approve();

    Ok(Json(json!({ "message": "Approved" })))
}
