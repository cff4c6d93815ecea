/// Authentication extractor
use crate::{
    account::Identity, api::middleware::extract_bearer_token, context::AppContext,
    error::ShareError,
};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// Authenticated context - extracts and verifies the bearer token from the
/// request
///
/// Every protected handler takes this; verification happens per request and
/// is never cached.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub identity: Identity,
}

#[async_trait]
impl FromRequestParts<AppContext> for AuthContext {
    type Rejection = ShareError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers).ok_or(ShareError::MissingToken)?;

        let identity = state.account_manager.verify_token(&token)?;

        Ok(AuthContext { identity })
    }
}
