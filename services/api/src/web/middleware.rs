//! services/api/src/web/middleware.rs
//!
//! Principal-extraction middleware for protected routes.
//!
//! Authentication lives in an external identity service; by the time a
//! request reaches this process, the gateway has attached the caller's id
//! and role as trusted headers. This middleware only parses them.

use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use edu_bridge_core::domain::{Principal, Role};
use uuid::Uuid;

const USER_ID_HEADER: &str = "x-user-id";
const USER_ROLE_HEADER: &str = "x-user-role";

/// Middleware that extracts the authenticated principal from the
/// `x-user-id` and `x-user-role` headers.
///
/// If both are present and well-formed, inserts a [`Principal`] into the
/// request extensions for handlers to use. Otherwise returns 401.
pub async fn require_principal(req: Request, next: Next) -> Result<Response, StatusCode> {
    let principal = principal_from_headers(req.headers()).ok_or(StatusCode::UNAUTHORIZED)?;

    let mut req = req;
    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

fn principal_from_headers(headers: &HeaderMap) -> Option<Principal> {
    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|raw| Uuid::parse_str(raw).ok())?;

    let role = match headers.get(USER_ROLE_HEADER).and_then(|v| v.to_str().ok())? {
        "STUDENT" => Role::Student,
        "TUTOR" => Role::Tutor,
        "ADMIN" => Role::Admin,
        _ => return None,
    };

    Some(Principal { user_id, role })
}
