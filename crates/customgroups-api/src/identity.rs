//! Calling principal extraction
//!
//! The user id comes from a header set by the authenticating proxy in front
//! of this service; tokens are not validated here. Super-admins are the
//! configured user ids.

use axum::{extract::FromRequestParts, http::request::Parts};

use customgroups_core::domain::Principal;

use crate::error::ApiError;
use crate::state::AppState;

pub struct CurrentPrincipal(pub Principal);

impl FromRequestParts<AppState> for CurrentPrincipal {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(state.auth.user_header.as_str())
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Missing user identity".into()))?;

        let is_super_admin = state.auth.is_super_admin(user_id);
        Ok(CurrentPrincipal(Principal::new(user_id, is_super_admin)))
    }
}
