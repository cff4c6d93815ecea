/// API routes and handlers
pub mod auth;
pub mod media;
pub mod middleware;

use crate::context::AppContext;
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new().merge(auth::routes()).merge(media::routes())
}
