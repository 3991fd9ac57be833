//! User profile business logic.
//!
//! Authentication lives with the external provider; this module maps an
//! authenticated user id to a profile and its role, and lets admins manage roles.

use crate::{
    core::permissions::{Actor, Capability, require},
    entities::{UserProfile, user_profile, user_profile::Role},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Fields of a profile created by an admin.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct NewProfile {
    /// Id from the upstream identity provider
    pub user_id: String,
    /// Display name
    pub full_name: String,
    /// Initial role
    pub role: Role,
    /// Where alerts and reports are sent
    #[serde(default)]
    pub notification_email: Option<String>,
}

impl NewProfile {
    /// Requires a user id, a 3 to 255 character name and a plausible email.
    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(Error::validation("User id is required"));
        }
        let name_len = self.full_name.trim().chars().count();
        if !(3..=255).contains(&name_len) {
            return Err(Error::validation(
                "Full name must have between 3 and 255 characters",
            ));
        }
        if let Some(email) = &self.notification_email {
            let looks_like_email = email
                .split_once('@')
                .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
            if !looks_like_email {
                return Err(Error::validation(format!("Invalid e-mail: {email:?}")));
            }
        }
        Ok(())
    }
}

/// Finds the profile of an authenticated user.
pub async fn get_profile_by_user_id(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Option<user_profile::Model>> {
    UserProfile::find()
        .filter(user_profile::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Builds the request context for an authenticated user. Users without a profile
/// are rejected rather than treated as viewers.
pub async fn resolve_actor(db: &DatabaseConnection, user_id: &str) -> Result<Actor> {
    let profile = get_profile_by_user_id(db, user_id)
        .await?
        .ok_or_else(|| Error::UnknownUser {
            user_id: user_id.to_string(),
        })?;
    Ok(Actor::new(profile.user_id, profile.role))
}

async fn insert_profile(db: &DatabaseConnection, input: NewProfile) -> Result<user_profile::Model> {
    if get_profile_by_user_id(db, input.user_id.trim()).await?.is_some() {
        return Err(Error::Conflict {
            message: format!("A profile for {} already exists", input.user_id.trim()),
        });
    }

    let now = Utc::now();
    let model = user_profile::ActiveModel {
        user_id: Set(input.user_id.trim().to_string()),
        full_name: Set(input.full_name.trim().to_string()),
        role: Set(input.role),
        notification_email: Set(input.notification_email),
        receive_alerts: Set(true),
        receive_reports: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Creates a profile for an account that already exists at the auth provider.
#[instrument(skip(db, input), fields(user_id = %actor.user_id))]
pub async fn create_profile(
    db: &DatabaseConnection,
    actor: &Actor,
    input: NewProfile,
) -> Result<user_profile::Model> {
    require(actor, Capability::ManageUsers)?;
    input.validate()?;
    let created = insert_profile(db, input).await?;
    info!(profile_id = created.id, role = %created.role, "Profile created");
    Ok(created)
}

/// Makes sure at least one admin exists. Used once at startup to hand the first
/// account its role; a no-op as soon as any admin is present.
pub async fn bootstrap_admin(
    db: &DatabaseConnection,
    user_id: &str,
    full_name: &str,
) -> Result<Option<user_profile::Model>> {
    let has_admin = UserProfile::find()
        .filter(user_profile::Column::Role.eq(Role::Admin))
        .one(db)
        .await?
        .is_some();
    if has_admin {
        return Ok(None);
    }

    let input = NewProfile {
        user_id: user_id.to_string(),
        full_name: full_name.to_string(),
        role: Role::Admin,
        notification_email: None,
    };
    input.validate()?;

    // An existing non-admin profile is promoted instead of duplicated
    if let Some(existing) = get_profile_by_user_id(db, user_id).await? {
        let mut model: user_profile::ActiveModel = existing.into();
        model.role = Set(Role::Admin);
        model.updated_at = Set(Utc::now());
        let promoted = model.update(db).await?;
        info!(user_id, "Existing profile promoted to admin");
        return Ok(Some(promoted));
    }

    let created = insert_profile(db, input).await?;
    info!(user_id, "Bootstrap admin created");
    Ok(Some(created))
}

/// Lists every profile by name.
pub async fn list_profiles(
    db: &DatabaseConnection,
    actor: &Actor,
) -> Result<Vec<user_profile::Model>> {
    require(actor, Capability::ManageUsers)?;
    UserProfile::find()
        .order_by_asc(user_profile::Column::FullName)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Changes the role of a profile. Admins cannot change their own role, which keeps
/// the last admin from locking everybody out.
#[instrument(skip(db), fields(user_id = %actor.user_id))]
pub async fn update_role(
    db: &DatabaseConnection,
    actor: &Actor,
    profile_id: i64,
    role: Role,
) -> Result<user_profile::Model> {
    require(actor, Capability::ManageUsers)?;

    let profile = UserProfile::find_by_id(profile_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("UserProfile", profile_id))?;

    if profile.user_id == actor.user_id {
        return Err(Error::validation("You cannot change your own role"));
    }

    let mut model: user_profile::ActiveModel = profile.into();
    model.role = Set(role);
    model.updated_at = Set(Utc::now());
    let updated = model.update(db).await?;

    info!(profile_id, role = %updated.role, "Role changed");
    Ok(updated)
}

/// Admins who opted into due-date alerts and have an address to send them to.
pub async fn alert_recipients(db: &DatabaseConnection) -> Result<Vec<user_profile::Model>> {
    UserProfile::find()
        .filter(user_profile::Column::Role.eq(Role::Admin))
        .filter(user_profile::Column::ReceiveAlerts.eq(true))
        .filter(user_profile::Column::NotificationEmail.is_not_null())
        .order_by_asc(user_profile::Column::FullName)
        .all(db)
        .await
        .map_err(Into::into)
}
