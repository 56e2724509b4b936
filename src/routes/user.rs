use crate::{
    AppState,
    auth::{Actor, create_token, expired_session_cookie, session_cookie},
    dto::{FormErrors, LoginForm, NextQuery, SignupForm},
    errors::ApiError,
    models::User,
    views::{LoginPage, SignupPage},
};
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use bcrypt::{hash, verify};
use tracing::{info, warn};
use validator::Validate;

use super::{redirect, render};

const BAD_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

/// Redirect that also sets the session cookie for `user`.
fn log_in(state: &AppState, user: &User, location: &str) -> Result<Response, ApiError> {
    let token = create_token(&user.id, &user.username, state.jwt_secret())?;
    let jar = CookieJar::new().add(session_cookie(token));
    Ok((jar, redirect(location)).into_response())
}

/// GET /auth/signup/
pub async fn signup_form(actor: Actor) -> Result<Response, ApiError> {
    render(SignupPage {
        viewer: actor.username().map(str::to_owned),
        ..Default::default()
    })
}

/// POST /auth/signup/
/// Body: username, email, password
pub async fn signup(
    State(state): State<AppState>,
    Form(payload): Form<SignupForm>,
) -> Result<Response, ApiError> {
    let rejected = |payload: SignupForm, errors: FormErrors| {
        render(SignupPage {
            viewer: None,
            username: payload.username,
            email: payload.email,
            errors,
        })
    };

    if let Err(e) = payload.validate() {
        return rejected(payload, e.into());
    }

    let cost = state.config.bcrypt_cost;
    let password = payload.password.clone();
    let hashed_password = tokio::task::spawn_blocking(move || hash(password, cost))
        .await
        .map_err(|e| ApiError::InternalError(format!("Hashing task failed: {}", e)))?
        .map_err(|e| ApiError::InternalError(format!("Password hashing failed: {}", e)))?;

    let user = match state
        .store
        .create_user(&payload.username, &payload.email, hashed_password)
    {
        Ok(user) => user,
        Err(ApiError::Conflict(msg)) => {
            let mut errors = FormErrors::default();
            let field = if msg.contains("email") { "email" } else { "username" };
            errors.add(field, msg);
            return rejected(payload, errors);
        }
        Err(e) => return Err(e),
    };

    info!("New user registered: {}", user.username);

    log_in(&state, &user, "/")
}

/// GET /auth/login/?next=/path/
pub async fn login_form(actor: Actor, Query(query): Query<NextQuery>) -> Result<Response, ApiError> {
    render(LoginPage {
        viewer: actor.username().map(str::to_owned),
        next: query.next,
        ..Default::default()
    })
}

/// POST /auth/login/
/// Body: username, password, next
pub async fn login(
    State(state): State<AppState>,
    Form(payload): Form<LoginForm>,
) -> Result<Response, ApiError> {
    let rejected = |payload: LoginForm, errors: FormErrors| {
        render(LoginPage {
            viewer: None,
            username: payload.username,
            next: payload.next,
            errors,
        })
    };

    if let Err(e) = payload.validate() {
        return rejected(payload, e.into());
    }

    let Some(user) = state.store.user_by_username(&payload.username) else {
        warn!("Login attempt for unknown user {}", payload.username);
        let mut errors = FormErrors::default();
        errors.add("__all__", BAD_LOGIN);
        return rejected(payload, errors);
    };

    // Verify password
    let password = payload.password.clone();
    let hashed = user.hashed_password.clone();
    let valid = tokio::task::spawn_blocking(move || verify(password, &hashed))
        .await
        .map_err(|e| ApiError::InternalError(format!("Verification task failed: {}", e)))?
        .map_err(|e| ApiError::InternalError(format!("Password verification failed: {}", e)))?;

    if !valid {
        warn!("Wrong password for {}", user.username);
        let mut errors = FormErrors::default();
        errors.add("__all__", BAD_LOGIN);
        return rejected(payload, errors);
    }

    info!("User logged in: {}", user.username);

    log_in(&state, &user, LoginForm::redirect_target(&payload.next))
}

/// GET|POST /auth/logout/
pub async fn logout(actor: Actor, jar: CookieJar) -> Response {
    if let Some(name) = actor.username() {
        info!("User logged out: {}", name);
    }
    (jar.add(expired_session_cookie()), redirect("/")).into_response()
}
