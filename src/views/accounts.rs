use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Redirect},
    Form,
};
use minijinja::context;
use serde::Deserialize;

use super::error::{page, PageResult};
use crate::auth::{self, CurrentUser, LOGIN_PATH};
use crate::domain::DomainError;
use crate::forms::{safe_next, FormErrors, LoginForm, RegistrationForm, NON_FIELD};
use crate::infrastructure::AppState;
use crate::models::user::ROLE_USER;

const AFTER_LOGIN: &str = "/movies/";
const INVALID_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

pub async fn register_form(user: Option<CurrentUser>) -> PageResult {
    page(
        "register.html",
        context! {
            user => user.map(|u| u.0),
            form => context! { username => "" },
            errors => FormErrors::default(),
        },
    )
}

pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegistrationForm>,
) -> PageResult {
    let valid = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => {
            return page("register.html", context! { form => form.echo(), errors });
        }
    };

    let password_hash = auth::hash_password(&valid.password).map_err(DomainError::Internal)?;

    match state
        .users
        .create(valid.username, password_hash, ROLE_USER)
        .await
    {
        Ok(_) => Ok(Redirect::to(LOGIN_PATH).into_response()),
        Err(DomainError::Conflict(_)) => {
            let errors = FormErrors::single("username", "A user with that username already exists.");
            page("register.html", context! { form => form.echo(), errors })
        }
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

pub async fn login_form(Query(params): Query<LoginQuery>) -> PageResult {
    page(
        "login.html",
        context! {
            form => context! { username => "" },
            next => params.next.unwrap_or_default(),
            errors => FormErrors::default(),
        },
    )
}

pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> PageResult {
    let rerender = |errors: FormErrors| {
        page(
            "login.html",
            context! {
                form => context! { username => form.username.clone() },
                next => form.next.clone(),
                errors,
            },
        )
    };

    if let Err(errors) = form.validate() {
        return rerender(errors);
    }

    tracing::info!("Login attempt for user: {}", form.username);

    let Some((account, password_hash)) = state.users.find_credentials(&form.username).await?
    else {
        tracing::warn!("User not found: {}", form.username);
        return rerender(FormErrors::single(NON_FIELD, INVALID_LOGIN));
    };

    match auth::verify_password(&form.password, &password_hash) {
        Ok(true) => {}
        _ => {
            tracing::warn!("Password verification failed for user: {}", account.username);
            return rerender(FormErrors::single(NON_FIELD, INVALID_LOGIN));
        }
    }

    let token =
        auth::create_jwt(account.id, &account.username, &account.role).map_err(DomainError::Internal)?;
    let target = safe_next(&form.next).unwrap_or(AFTER_LOGIN);
    tracing::info!("User {} logged in", account.username);

    Ok((
        [(header::SET_COOKIE, auth::session_cookie(&token))],
        Redirect::to(target),
    )
        .into_response())
}

pub async fn logout(user: Option<CurrentUser>) -> PageResult {
    if let Some(CurrentUser(claims)) = user {
        tracing::info!("User {} logged out", claims.sub);
    }
    Ok((
        [(header::SET_COOKIE, auth::clear_session_cookie())],
        Redirect::to(AFTER_LOGIN),
    )
        .into_response())
}

pub async fn profile(State(state): State<AppState>, CurrentUser(claims): CurrentUser) -> PageResult {
    let Some(account) = state.users.find_by_id(claims.uid).await? else {
        // Token outlived its account
        return Ok((
            [(header::SET_COOKIE, auth::clear_session_cookie())],
            Redirect::to(LOGIN_PATH),
        )
            .into_response());
    };

    let review_count = state.reviews.count_by_user(account.id).await?;

    page(
        "profile.html",
        context! { user => claims, account, review_count },
    )
}
