use leptos::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::OtpType;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub email_confirmed: bool,
}

/// Result of a password sign-in the page can act on.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum SignInOutcome {
    SignedIn(SessionUser),
    /// The account exists but its confirmation link was never used.
    EmailNotConfirmed(String),
}

#[cfg(feature = "ssr")]
mod store {
    use axum::Extension;
    use leptos::prelude::ServerFnError;
    use leptos_axum::extract;
    use tower_sessions::Session;

    use super::SessionUser;
    use crate::services::identity::{IdentityError, Session as AuthSession, User};
    use crate::state::AppState;

    const SESSION_KEY: &str = "auth";

    impl From<&User> for SessionUser {
        fn from(user: &User) -> Self {
            Self {
                id: user.id.clone(),
                email: user.email.clone().unwrap_or_default(),
                email_confirmed: user.email_confirmed_at.is_some(),
            }
        }
    }

    const UNAVAILABLE: &str = "A apărut o eroare neașteptată. Te rugăm să încerci din nou.";

    pub async fn context() -> Result<(AppState, Session), ServerFnError> {
        let Extension(state) = extract::<Extension<AppState>>().await.map_err(|e| {
            tracing::error!(error = %e, "app state missing from request");
            ServerFnError::new(UNAVAILABLE)
        })?;
        let Extension(session) = extract::<Extension<Session>>().await.map_err(|e| {
            tracing::error!(error = %e, "session layer missing from request");
            ServerFnError::new(UNAVAILABLE)
        })?;
        Ok((state, session))
    }

    /// Log the provider's own message and hand the user the localized one.
    pub fn rejected(action: &'static str, err: IdentityError) -> ServerFnError {
        tracing::warn!(action, code = ?err.code(), error = %err, "identity provider call failed");
        ServerFnError::new(err.user_message())
    }

    pub async fn save(session: &Session, auth: &AuthSession) -> Result<SessionUser, ServerFnError> {
        session.insert(SESSION_KEY, auth).await?;
        Ok(SessionUser::from(&auth.user))
    }

    pub async fn load(session: &Session) -> Option<AuthSession> {
        session.get(SESSION_KEY).await.ok().flatten()
    }

    pub async fn clear(session: &Session) {
        let _ = session.remove::<AuthSession>(SESSION_KEY).await;
    }
}

#[server]
pub async fn get_current_session() -> Result<Option<SessionUser>, ServerFnError> {
    let (state, session) = store::context().await?;

    let Some(auth) = store::load(&session).await else {
        return Ok(None);
    };
    if !auth.is_expired(chrono::Utc::now().timestamp()) {
        return Ok(Some(SessionUser::from(&auth.user)));
    }

    match state.identity.refresh_session(&auth.refresh_token).await {
        Ok(fresh) => store::save(&session, &fresh).await.map(Some),
        Err(e) => {
            tracing::warn!(error = %e, "stored session could not be refreshed");
            store::clear(&session).await;
            Ok(None)
        }
    }
}

#[server]
pub async fn establish_session(
    access_token: String,
    refresh_token: String,
    expires_at: Option<i64>,
) -> Result<SessionUser, ServerFnError> {
    let (state, session) = store::context().await?;

    let auth = state
        .identity
        .set_session(&access_token, &refresh_token, expires_at)
        .await
        .map_err(|e| store::rejected("set_session", e))?;

    tracing::info!(user = %auth.user.id, "session established from confirmation link");
    store::save(&session, &auth).await
}

#[server]
pub async fn verify_token(token_hash: String, kind: OtpType) -> Result<SessionUser, ServerFnError> {
    let (state, session) = store::context().await?;

    let auth = state
        .identity
        .verify_otp(&token_hash, kind)
        .await
        .map_err(|e| store::rejected("verify_otp", e))?;

    tracing::info!(user = %auth.user.id, ?kind, "email confirmed");
    store::save(&session, &auth).await
}

#[server]
pub async fn resend_confirmation(email: String) -> Result<(), ServerFnError> {
    use crate::models::{is_valid_email, ResendError};

    let (state, _) = store::context().await?;

    let email = email.trim();
    if !is_valid_email(email) {
        return Err(ServerFnError::new(ResendError::InvalidEmail.to_string()));
    }

    state
        .identity
        .resend_signup(email, &state.config.confirm_redirect())
        .await
        .map_err(|e| store::rejected("resend_signup", e))?;

    tracing::info!("confirmation email resent");
    Ok(())
}

#[server]
pub async fn sign_in(email: String, password: String) -> Result<SignInOutcome, ServerFnError> {
    let (state, session) = store::context().await?;

    match state.identity.sign_in_with_password(&email, &password).await {
        Ok(auth) => store::save(&session, &auth).await.map(SignInOutcome::SignedIn),
        Err(e) if e.code() == Some("email_not_confirmed") => {
            tracing::info!("sign-in refused until the email is confirmed");
            Ok(SignInOutcome::EmailNotConfirmed(email.trim().to_string()))
        }
        Err(e) => Err(store::rejected("sign_in", e)),
    }
}

#[server]
pub async fn sign_out() -> Result<(), ServerFnError> {
    let (state, session) = store::context().await?;

    if let Some(auth) = store::load(&session).await {
        // The local session goes regardless of what the provider says.
        if let Err(e) = state.identity.sign_out(&auth.access_token).await {
            tracing::warn!(error = %e, "provider sign-out failed");
        }
    }
    session.delete().await?;
    Ok(())
}
