use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::auth::{self, permissions::permits, AuthError, Role};
use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::state::AppState;

pub const ORG_HEADER: &str = "x-org-id";
pub const ROLES_HEADER: &str = "x-roles";
pub const PROJECT_HEADER: &str = "x-project-id";

/// Who is calling, and on behalf of which organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub email: Option<String>,
    pub roles: Vec<Role>,
    pub project_id: Option<Uuid>,
}

impl TenantContext {
    /// Resolve the session first, then the tenant headers.
    pub fn from_headers(headers: &HeaderMap, security: &SecurityConfig) -> Result<Self, ApiError> {
        let token = session_token(headers, &security.session_cookie)?;
        let claims = auth::decode_session_token(security, &token)?;

        let organization_id = required_uuid(headers, ORG_HEADER)?;
        let project_id = optional_uuid(headers, PROJECT_HEADER)?;
        let roles = match header_str(headers, ROLES_HEADER)? {
            Some(raw) => Role::parse_list(raw),
            None => vec![Role::Member],
        };

        Ok(Self {
            organization_id,
            user_id: claims.sub,
            email: claims.email,
            roles,
            project_id,
        })
    }

    pub fn highest_role(&self) -> Option<Role> {
        self.roles.iter().max().copied()
    }

    pub fn authorize(&self, required: Role) -> Result<(), ApiError> {
        if permits(&self.roles, required) {
            Ok(())
        } else {
            tracing::warn!(
                user_id = %self.user_id,
                organization_id = %self.organization_id,
                required = required.as_str(),
                "Permission denied"
            );
            Err(ApiError::forbidden(format!("Requires {} role", required.as_str())))
        }
    }

    /// Managers and above may modify rows owned by other users.
    pub fn is_privileged(&self) -> bool {
        permits(&self.roles, Role::Manager)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for TenantContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        TenantContext::from_headers(&parts.headers, &state.config().security)
    }
}

fn session_token(headers: &HeaderMap, cookie_name: &str) -> Result<String, AuthError> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(cookie_name) {
        if !cookie.value().is_empty() {
            return Ok(cookie.value().to_string());
        }
    }

    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingSession)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;
    auth::bearer_token(header).map(str::to_string)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, ApiError> {
    match headers.get(name) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(|v| Some(v.trim()))
            .map_err(|_| ApiError::internal_server_error(format!("{} header is not valid text", name))),
    }
}

fn required_uuid(headers: &HeaderMap, name: &str) -> Result<Uuid, ApiError> {
    optional_uuid(headers, name)?
        .ok_or_else(|| ApiError::internal_server_error(format!("Missing {} header", name)))
}

// Malformed tenant headers surface as 500, not 400.
fn optional_uuid(headers: &HeaderMap, name: &str) -> Result<Option<Uuid>, ApiError> {
    match header_str(headers, name)? {
        None | Some("") => Ok(None),
        Some(raw) => Uuid::parse_str(raw)
            .map(Some)
            .map_err(|_| ApiError::internal_server_error(format!("Invalid {} header", name))),
    }
}
