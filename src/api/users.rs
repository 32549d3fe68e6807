//! Read-only user accounts: `/users/` and `/users/{user_pk}/`.
use crate::api::context::PathIds;
use crate::api::error::{api_internal, api_not_found, ApiError};
use crate::api::AppState;
use crate::entities::user;
use crate::serializers::{UrlBuilder, UserView};
use axum::extract::State;
use axum::Json;

pub(crate) async fn list_users(
    State(state): State<AppState>,
    urls: UrlBuilder,
) -> Result<Json<Vec<UserView>>, ApiError> {
    let users = state
        .store
        .with_conn(user::list_users)
        .map_err(|err| api_internal("failed to list users", &err))?;
    Ok(Json(users.iter().map(|u| UserView::new(&urls, u)).collect()))
}

pub(crate) async fn retrieve_user(
    State(state): State<AppState>,
    urls: UrlBuilder,
    ids: PathIds,
) -> Result<Json<UserView>, ApiError> {
    let user_id = ids.pk("user_pk")?;
    let found = state
        .store
        .with_conn(|conn| user::get_user(conn, user_id))
        .map_err(|err| api_internal("failed to load user", &err))?
        .ok_or_else(api_not_found)?;
    Ok(Json(UserView::new(&urls, &found)))
}
