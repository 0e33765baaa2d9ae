//! Login handlers: password and OAuth.

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::{AppState, OAuthState};
use crate::auth::{AuthError, OAuthError};
use crate::user::UserInfo;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response body.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

/// Password login.
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = state
        .users
        .verify_credentials(&request.email, &request.password)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let token = state.auth.issue_token(&user.principal())?;
    info!(user_id = user.id, "User logged in");

    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

fn oauth_state(state: &AppState) -> ApiResult<&OAuthState> {
    state
        .oauth
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("OAuth login is not configured"))
}

/// Start an OAuth login: redirect the browser to the provider.
#[instrument(skip(state))]
pub async fn oauth_login(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let oauth = oauth_state(&state)?;
    let login_state = oauth
        .states
        .issue()
        .ok_or_else(|| ApiError::service_unavailable("too many pending OAuth logins"))?;
    Ok(Redirect::temporary(
        &oauth.provider.authorize_url(&login_state),
    ))
}

/// Query parameters the provider sends back.
#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// OAuth callback response body.
#[derive(Debug, Serialize)]
pub struct OAuthLoginResponse {
    pub message: String,
    pub user: UserInfo,
    pub token: String,
}

/// Finish an OAuth login.
///
/// The provider's email must belong to an existing user; accounts are never
/// created here.
#[instrument(skip(state, query))]
pub async fn oauth_callback(
    State(state): State<AppState>,
    Query(query): Query<OAuthCallbackQuery>,
) -> ApiResult<Json<OAuthLoginResponse>> {
    let oauth = oauth_state(&state)?;

    if let Some(error) = query.error {
        warn!(%error, "Identity provider returned an error");
        return Err(ApiError::bad_request(format!(
            "OAuth login was not completed: {error}"
        )));
    }

    let login_state = query.state.unwrap_or_default();
    if !oauth.states.consume(&login_state) {
        return Err(ApiError::bad_request("Invalid OAuth state"));
    }

    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing authorization code"))?;

    let identity = oauth
        .provider
        .exchange_code(&code)
        .await
        .map_err(|e| match e {
            OAuthError::UnverifiedEmail => ApiError::forbidden(e.to_string()),
            other => {
                warn!(error = %other, "OAuth code exchange failed");
                ApiError::bad_gateway("identity provider exchange failed")
            }
        })?;

    let principal = state
        .auth
        .principals()
        .find_by_email(&identity.email)
        .await
        .map_err(|e| AuthError::Storage(format!("{e:#}")))?
        .ok_or(AuthError::PrincipalNotFound)?;

    let user = state
        .users
        .get_user(principal.id)
        .await?
        .ok_or(AuthError::PrincipalNotFound)?;

    let token = state.auth.issue_token(&principal)?;
    info!(user_id = user.id, "User logged in via OAuth");

    Ok(Json(OAuthLoginResponse {
        message: "login successful".to_string(),
        user: user.into(),
        token,
    }))
}
