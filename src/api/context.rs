//! Per-request context.
//!
//! Everything a handler needs beyond its body is pulled out of the request
//! once, by extractors: the caller, the URL builder, the raw path ids and the
//! resolved parent objects. A handler that takes a `ProgramScope` never sees
//! a program that is missing or belongs to another office; the extractor has
//! already answered 404.
use crate::api::error::{api_forbidden, api_internal, api_not_found, api_parse_error, ApiError};
use crate::api::AppState;
use crate::entities::{office, plan, program, Office, Plan, Program};
use crate::permissions::{Caller, Target};
use crate::serializers::UrlBuilder;
use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequestParts, Path};
use axum::http::header::HOST;
use axum::http::request::Parts;
use axum::Json;
use serde_json::Value;
use std::collections::HashMap;
use std::convert::Infallible;

// ============================================================================
// CALLER / URLS / PATH IDS
// ============================================================================

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(_parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Authentication is disabled; every request is anonymous.
        Ok(Caller::anonymous())
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for UrlBuilder {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let host = parts
            .headers
            .get(HOST)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .or_else(|| parts.uri.authority().map(|authority| authority.to_string()));

        Ok(match host {
            Some(host) => UrlBuilder::for_host(&host),
            None => UrlBuilder::relative(),
        })
    }
}

/// Raw path parameters; ids are parsed on demand so a non-numeric id is a
/// plain 404 like any other unknown id.
#[derive(Debug, Clone)]
pub struct PathIds(HashMap<String, String>);

impl PathIds {
    pub fn pk(&self, name: &str) -> Result<i64, ApiError> {
        self.0
            .get(name)
            .and_then(|raw| raw.parse().ok())
            .ok_or_else(api_not_found)
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for PathIds {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|_| api_not_found())?;
        Ok(PathIds(params))
    }
}

// ============================================================================
// PARENT SCOPES
// ============================================================================

/// `office_pk` resolved among all offices
#[derive(Debug, Clone)]
pub struct OfficeScope {
    pub office: Office,
}

/// `program_pk` resolved within `office_pk`
#[derive(Debug, Clone)]
pub struct ProgramScope {
    pub office_id: i64,
    pub program: Program,
}

/// `plan_pk` resolved within the program scope
#[derive(Debug, Clone)]
pub struct PlanScope {
    pub office_id: i64,
    pub program: Program,
    pub plan: Plan,
}

fn resolve_program(state: &AppState, ids: &PathIds) -> Result<ProgramScope, ApiError> {
    let office_id = ids.pk("office_pk")?;
    let program_id = ids.pk("program_pk")?;

    let program = state
        .store
        .with_conn(|conn| program::get_program_in_office(conn, office_id, program_id))
        .map_err(|err| api_internal("failed to load program", &err))?
        .ok_or_else(api_not_found)?;

    Ok(ProgramScope { office_id, program })
}

#[async_trait]
impl FromRequestParts<AppState> for OfficeScope {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let ids = PathIds::from_request_parts(parts, state).await?;
        let office_id = ids.pk("office_pk")?;

        let office = state
            .store
            .with_conn(|conn| office::get_office(conn, office_id))
            .map_err(|err| api_internal("failed to load office", &err))?
            .ok_or_else(api_not_found)?;

        Ok(OfficeScope { office })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for ProgramScope {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let ids = PathIds::from_request_parts(parts, state).await?;
        resolve_program(state, &ids)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for PlanScope {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let ids = PathIds::from_request_parts(parts, state).await?;
        let ProgramScope { office_id, program } = resolve_program(state, &ids)?;
        let plan_id = ids.pk("plan_pk")?;

        let plan = state
            .store
            .with_conn(|conn| plan::get_plan_in_program(conn, program.id, plan_id))
            .map_err(|err| api_internal("failed to load plan", &err))?
            .ok_or_else(api_not_found)?;

        Ok(PlanScope {
            office_id,
            program,
            plan,
        })
    }
}

// ============================================================================
// GATES AND BODIES
// ============================================================================

/// Passes when at least one of `required` is allowed for `target`.
pub fn authorize(
    state: &AppState,
    caller: &Caller,
    required: &[&str],
    target: Option<Target>,
) -> Result<(), ApiError> {
    if state.policy.allows_any(caller, required, target) {
        Ok(())
    } else {
        tracing::debug!(?target, ?required, "permission denied");
        Err(api_forbidden())
    }
}

pub fn read_payload(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(api_parse_error(rejection.status(), &rejection.body_text())),
    }
}
