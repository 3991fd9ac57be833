//! Profile, role and settings endpoints.
//!
//! Reads of the color scheme are open to every role because the calendar needs it;
//! all writes here are admin-only and checked in the core functions.

use crate::{
    api::{AppState, CurrentUser},
    core::{
        permissions::{Capability, Permissions, require},
        settings::{self, AlertSettings, ColorScheme},
        user::{self, NewProfile},
    },
    entities::user_profile::{self, Role},
    errors::Result,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

/// The caller's identity and what their role allows.
#[derive(Debug, Serialize)]
pub struct Me {
    /// Id from the upstream identity provider
    pub user_id: String,
    /// Role of the caller's profile
    pub role: Role,
    /// Capability flags derived from `role`
    pub permissions: Permissions,
}

/// Body of a role update.
#[derive(Debug, Deserialize)]
pub struct RoleChange {
    /// New role for the profile
    pub role: Role,
}

/// `GET /me`
pub async fn me(CurrentUser(actor): CurrentUser) -> Json<Me> {
    Json(Me {
        permissions: Permissions::for_role(actor.role),
        role: actor.role,
        user_id: actor.user_id,
    })
}

/// `GET /users`: every profile. Admin only.
pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<Vec<user_profile::Model>>> {
    Ok(Json(user::list_profiles(&state.database, &actor).await?))
}

/// `POST /users`
pub async fn create_user(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(input): Json<NewProfile>,
) -> Result<(StatusCode, Json<user_profile::Model>)> {
    let created = user::create_profile(&state.database, &actor, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /users/{id}/role`: admins cannot change their own role.
pub async fn update_role(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<i64>,
    Json(change): Json<RoleChange>,
) -> Result<Json<user_profile::Model>> {
    let updated = user::update_role(&state.database, &actor, id, change.role).await?;
    Ok(Json(updated))
}

/// `GET /settings/colors`
pub async fn get_colors(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<ColorScheme>> {
    require(&actor, Capability::ViewCalendar)?;
    Ok(Json(settings::get_color_scheme(&state.database).await?))
}

/// `PUT /settings/colors`: every color must be `#RRGGBB`.
pub async fn save_colors(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(scheme): Json<ColorScheme>,
) -> Result<StatusCode> {
    settings::save_color_scheme(&state.database, &actor, &scheme).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /settings/alerts`
pub async fn get_alert_settings(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<AlertSettings>> {
    require(&actor, Capability::ViewAlerts)?;
    Ok(Json(settings::get_alert_settings(&state.database).await?))
}

/// `PUT /settings/alerts`: out-of-range thresholds are a 422.
pub async fn save_alert_settings(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(input): Json<AlertSettings>,
) -> Result<StatusCode> {
    settings::save_alert_settings(&state.database, &actor, &input).await?;
    Ok(StatusCode::NO_CONTENT)
}
