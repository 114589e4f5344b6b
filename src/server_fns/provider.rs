use async_trait::async_trait;
use leptos::prelude::ServerFnError;

use super::auth::{establish_session, get_current_session, resend_confirmation, verify_token};
use crate::models::{AuthProvider, FragmentTokens, OtpType, ProviderError};

/// [`AuthProvider`] backed by this app's server functions.
pub struct ServerProvider;

const UNREACHABLE: &str =
    "Serverul nu poate fi contactat momentan. Verifică conexiunea și încearcă din nou.";

/// Text for showing a server function failure to the user. Server-side
/// messages are already localized; transport failures get a generic one.
pub fn user_message(err: &ServerFnError) -> String {
    match err {
        ServerFnError::ServerError(msg) => msg.clone(),
        _ => UNREACHABLE.to_string(),
    }
}

fn provider_error(err: ServerFnError) -> ProviderError {
    match err {
        ServerFnError::ServerError(msg) => ProviderError::Rejected(msg),
        other => ProviderError::Unavailable(other.to_string()),
    }
}

#[async_trait(?Send)]
impl AuthProvider for ServerProvider {
    async fn set_session(&self, tokens: &FragmentTokens) -> Result<(), ProviderError> {
        establish_session(
            tokens.access_token.clone(),
            tokens.refresh_token.clone(),
            tokens.expires_at,
        )
        .await
        .map(|_| ())
        .map_err(provider_error)
    }

    async fn verify_otp(&self, token_hash: &str, kind: OtpType) -> Result<(), ProviderError> {
        verify_token(token_hash.to_string(), kind)
            .await
            .map(|_| ())
            .map_err(provider_error)
    }

    async fn has_session(&self) -> Result<bool, ProviderError> {
        get_current_session()
            .await
            .map(|user| user.is_some())
            .map_err(provider_error)
    }

    async fn resend_signup(&self, email: &str) -> Result<(), ProviderError> {
        resend_confirmation(email.to_string())
            .await
            .map_err(provider_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_rejections() {
        assert_eq!(
            provider_error(ServerFnError::new("Token has expired or is invalid")),
            ProviderError::Rejected("Token has expired or is invalid".into())
        );
        assert!(matches!(
            provider_error(ServerFnError::Request("connection refused".into())),
            ProviderError::Unavailable(_)
        ));
    }

    #[test]
    fn user_message_drops_transport_details() {
        assert_eq!(
            user_message(&ServerFnError::new("Email sau parolă incorecte.")),
            "Email sau parolă incorecte."
        );
        assert_eq!(
            user_message(&ServerFnError::Request("error sending request".into())),
            UNREACHABLE
        );
    }
}
