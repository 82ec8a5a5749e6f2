use leptos::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub username: String,
}

#[server]
pub async fn get_current_user() -> Result<Option<SessionUser>, ServerFnError> {
    use axum::Extension;
    use leptos_axum::extract;
    use tower_sessions::Session;

    let Extension(session) = extract::<Extension<Session>>()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;
    Ok(session.get("user").await.ok().flatten())
}

#[server]
pub async fn login(email: String, password: String) -> Result<SessionUser, ServerFnError> {
    use crate::{services::auth, state::AppState};
    use axum::Extension;
    use leptos_axum::extract;
    use tower_sessions::Session;

    let Extension(state) = extract::<Extension<AppState>>()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;
    let Extension(session) = extract::<Extension<Session>>()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let user = auth::login(&state.db, &email, &password)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    if !user.email_verified {
        return Err(ServerFnError::new("Please verify your email first"));
    }

    let session_user = SessionUser {
        id: user.id,
        email: user.email,
        username: user.username,
    };
    session.insert("user", &session_user).await?;
    Ok(session_user)
}

#[server]
pub async fn register(
    email: String,
    username: String,
    password: String,
) -> Result<(), ServerFnError> {
    use crate::{services::auth, state::AppState};
    use axum::Extension;
    use leptos_axum::extract;

    let Extension(state) = extract::<Extension<AppState>>()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let user_id = auth::register(&state.db, &email, &username, &password)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let token = auth::create_verification_token(&state.db, &user_id)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    state
        .email
        .send_verification(&email, &token)
        .await
        .map_err(ServerFnError::new)?;

    Ok(())
}

#[server]
pub async fn logout() -> Result<(), ServerFnError> {
    use axum::Extension;
    use leptos_axum::extract;
    use tower_sessions::Session;

    let Extension(session) = extract::<Extension<Session>>()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;
    session.delete().await?;
    Ok(())
}

/// Single-attempt verification of an emailed token. The failure message is
/// what the verification page shows, so it stays human-readable.
#[server]
pub async fn verify_email(token: String) -> Result<(), ServerFnError> {
    use crate::{services::auth, state::AppState};
    use axum::Extension;
    use leptos_axum::extract;

    let Extension(state) = extract::<Extension<AppState>>()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;
    auth::verify_email(&state.db, &token)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

/// Issue a fresh verification token and email it. Unknown addresses get a
/// silent Ok so this endpoint cannot be used to probe for accounts, same
/// rule as password reset requests.
#[server]
pub async fn resend_verification(email: String) -> Result<(), ServerFnError> {
    use crate::{db, services::auth, state::AppState};
    use axum::Extension;
    use leptos_axum::extract;

    let Extension(state) = extract::<Extension<AppState>>()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let Some(user) = db::get_user_by_email(&state.db, &email).await else {
        return Ok(());
    };

    if user.email_verified {
        return Err(ServerFnError::new(
            "This email address is already verified. You can log in.",
        ));
    }

    let token = auth::create_verification_token(&state.db, &user.id)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    state
        .email
        .send_verification(&user.email, &token)
        .await
        .map_err(ServerFnError::new)?;

    Ok(())
}
