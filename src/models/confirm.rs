use async_trait::async_trait;
use leptos::logging::{log, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::link::{ConfirmParams, FragmentTokens, QueryType};

/// One-time token types understood by the provider's verify endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpType {
    Signup,
    Email,
    Recovery,
    EmailChange,
    Magiclink,
    Invite,
}

/// Failure reported by the identity provider.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    /// The provider answered and refused the request.
    #[error("{0}")]
    Rejected(String),
    /// The provider could not be reached or its answer could not be read.
    #[error("{0}")]
    Unavailable(String),
}

/// Operations the confirmation page needs from the identity provider.
#[async_trait(?Send)]
pub trait AuthProvider {
    async fn set_session(&self, tokens: &FragmentTokens) -> Result<(), ProviderError>;
    async fn verify_otp(&self, token_hash: &str, kind: OtpType) -> Result<(), ProviderError>;
    async fn has_session(&self) -> Result<bool, ProviderError>;
    async fn resend_signup(&self, email: &str) -> Result<(), ProviderError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfirmError {
    #[error("Link invalid sau expirat. Te rugăm să soliciți un nou link de confirmare.")]
    LinkExpired,
    #[error("Linkul de confirmare nu a putut fi folosit: {0}")]
    Redirected(String),
    #[error("A apărut o eroare la confirmarea email-ului. Te rugăm să încerci din nou sau să contactezi suportul.")]
    Rejected,
    #[error("Tip de confirmare necunoscut. Te rugăm să contactezi suportul.")]
    UnknownType,
    #[error("A apărut o eroare neașteptată. Te rugăm să încerci din nou sau să contactezi suportul.")]
    Unexpected,
}

impl ConfirmError {
    /// Whether the page should offer to send a fresh confirmation email.
    pub fn offers_resend(&self) -> bool {
        let message = self.to_string().to_lowercase();
        message.contains("expirat") || message.contains("invalid")
    }

    fn from_provider(err: ProviderError) -> Self {
        match err {
            ProviderError::Rejected(_) => Self::Rejected,
            ProviderError::Unavailable(_) => Self::Unexpected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResendError {
    #[error("Te rugăm să introduci o adresă de email validă.")]
    InvalidEmail,
    #[error("Nu am putut trimite un nou link de confirmare: {0}")]
    Provider(String),
    #[error("Nu am putut trimite un nou link de confirmare. Te rugăm să încerci din nou.")]
    Unavailable,
}

/// What the confirmation page is currently showing.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmState {
    Confirming,
    Confirmed,
    Failed(ConfirmError),
    NewLinkSent,
}

impl ConfirmState {
    /// State after a resend attempt finished. Only a successful resend moves
    /// the page; failures stay in the form.
    pub fn after_resend(self, result: &Result<(), ResendError>) -> Self {
        match result {
            Ok(()) => Self::NewLinkSent,
            Err(_) => self,
        }
    }
}

impl From<Result<(), ConfirmError>> for ConfirmState {
    fn from(result: Result<(), ConfirmError>) -> Self {
        match result {
            Ok(()) => Self::Confirmed,
            Err(e) => Self::Failed(e),
        }
    }
}

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Run the confirmation flow for the parameters found in the page URL.
pub async fn confirm_email<P>(params: &ConfirmParams, provider: &P) -> Result<(), ConfirmError>
where
    P: AuthProvider + ?Sized,
{
    if let Some(redirect) = params.redirect_error() {
        warn!(
            "provider redirected with error: code={:?} description={:?}",
            redirect.code, redirect.description
        );
        if redirect.is_expired() {
            return Err(ConfirmError::LinkExpired);
        }
        let detail = redirect
            .description
            .or(redirect.code)
            .unwrap_or_default();
        return Err(ConfirmError::Redirected(detail));
    }

    if let Some(tokens) = params.fragment_tokens() {
        log!("found session tokens in fragment, type={:?}", tokens.kind);
        provider
            .set_session(&tokens)
            .await
            .map_err(|e| {
                warn!("setting session failed: {e}");
                ConfirmError::from_provider(e)
            })?;

        if tokens.kind.as_ref().is_some_and(|k| k.confirms_account()) {
            return Ok(());
        }
    }

    if let Some(query) = params.query_token() {
        log!("found token in query, type={:?}", query.kind);
        return match query.kind {
            Some(QueryType::EmailConfirm | QueryType::Signup) => {
                verify_with_fallback(provider, &query.token).await
            }
            _ => Err(ConfirmError::UnknownType),
        };
    }

    match provider.has_session().await {
        Ok(true) => Ok(()),
        Ok(false) => Err(ConfirmError::LinkExpired),
        Err(ProviderError::Rejected(e)) => {
            warn!("session lookup rejected: {e}");
            Err(ConfirmError::LinkExpired)
        }
        Err(e) => Err(ConfirmError::from_provider(e)),
    }
}

async fn verify_with_fallback<P>(provider: &P, token: &str) -> Result<(), ConfirmError>
where
    P: AuthProvider + ?Sized,
{
    match provider.verify_otp(token, OtpType::Email).await {
        Ok(()) => Ok(()),
        Err(ProviderError::Rejected(e)) => {
            warn!("email verification rejected ({e}), retrying as signup");
            provider
                .verify_otp(token, OtpType::Signup)
                .await
                .map_err(ConfirmError::from_provider)
        }
        Err(e) => Err(ConfirmError::from_provider(e)),
    }
}

/// Ask the provider for a fresh confirmation email. Invalid addresses never
/// leave the page.
pub async fn request_new_link<P>(email: &str, provider: &P) -> Result<(), ResendError>
where
    P: AuthProvider + ?Sized,
{
    let email = email.trim();
    if !is_valid_email(email) {
        return Err(ResendError::InvalidEmail);
    }
    provider.resend_signup(email).await.map_err(|e| match e {
        ProviderError::Rejected(msg) => ResendError::Provider(msg),
        ProviderError::Unavailable(msg) => {
            warn!("resend request failed: {msg}");
            ResendError::Unavailable
        }
    })
}
