//! Request extractors.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use hub_core::extract_bearer_token;

use crate::response::ApiError;
use crate::state::AppState;

/// Authenticated context from request.
///
/// Present on every protected route; construction fails with AUTH_001/002
/// before the handler runs.
#[derive(Debug, Clone)]
pub struct AuthContext;

#[async_trait]
impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let token_header = parts
            .headers
            .get("X-Service-Token")
            .and_then(|h| h.to_str().ok());

        let presented = extract_bearer_token(auth_header, token_header)?;
        state.token.verify(presented)?;

        Ok(AuthContext)
    }
}
