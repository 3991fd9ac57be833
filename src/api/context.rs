//! Resolves the calling user of a request into an [`Actor`].

use crate::{
    api::AppState,
    core::{permissions::Actor, user::resolve_actor},
    errors::Error,
};
use axum::{extract::FromRequestParts, http::request::Parts};

/// Header carrying the id of the user authenticated by the upstream provider.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller, with the role of their profile.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub Actor);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Error> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(Error::Unauthenticated)?;

        let actor = resolve_actor(&state.database, user_id).await?;
        Ok(Self(actor))
    }
}
