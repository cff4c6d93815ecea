/// Signup, login and profile endpoints
use crate::{
    account::{LoginRequest, LoginResponse, SignupRequest, UserSummary, UserView},
    auth::AuthContext,
    context::AppContext,
    error::ShareResult,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

/// Build auth routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/profile", get(profile))
}

/// Register a new user
async fn signup(
    State(ctx): State<AppContext>,
    Json(req): Json<SignupRequest>,
) -> ShareResult<impl IntoResponse> {
    ctx.account_manager
        .register(req.name, req.email, req.password, req.role)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

/// Authenticate and issue a session token
async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> ShareResult<Json<LoginResponse>> {
    let (user, token) = ctx.account_manager.login(&req.email, &req.password).await?;

    Ok(Json(LoginResponse {
        token,
        user: UserSummary {
            name: user.name,
            email: user.email,
            role: user.role,
        },
    }))
}

/// Fetch the authenticated user's profile
async fn profile(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> ShareResult<Json<UserView>> {
    let view = ctx
        .account_manager
        .get_profile(&auth.identity.user_id)
        .await?;

    Ok(Json(view))
}
