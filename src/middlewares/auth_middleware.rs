use axum::{body::Body, extract::State, http::Request, http::StatusCode, middleware::Next, response::Response};
use std::sync::Arc;

use crate::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};

/// Shared state for the token middleware layers.
pub struct AuthState {
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
}

fn claims_from_request(state: &AuthState, req: &Request<Body>) -> Result<crate::util::jwt::Claims, StatusCode> {
    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = state
        .jwt_utils
        .extract_token_from_header(auth_header)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;
    state
        .jwt_utils
        .validate_access_token(&token)
        .map_err(|_| StatusCode::UNAUTHORIZED)
}

/// Requires any valid access token. The validated claims are inserted
/// into request extensions, standing in for the session user object.
pub async fn user_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let claims = claims_from_request(&state, &req)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Requires the `king` authority on top of a valid access token.
pub async fn admin_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let claims = claims_from_request(&state, &req)?;

    if !claims.is_admin() {
        return Err(StatusCode::FORBIDDEN);
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
