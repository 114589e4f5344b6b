use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::models::OtpType;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("{message}")]
    Api {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },
    #[error("identity provider unreachable: {0}")]
    Http(#[from] reqwest::Error),
}

impl IdentityError {
    /// True when the provider refused the token itself, as opposed to failing.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(
            self,
            IdentityError::Api { status, .. }
                if *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN
        )
    }

    /// Provider error code, if the provider sent one.
    pub fn code(&self) -> Option<&str> {
        match self {
            IdentityError::Api { code, .. } => code.as_deref(),
            IdentityError::Http(_) => None,
        }
    }

    /// Localized text safe to show to the user. The provider's own message
    /// stays in the logs.
    pub fn user_message(&self) -> &'static str {
        let status = match self {
            IdentityError::Http(_) => {
                return "Serviciul de autentificare nu poate fi contactat momentan. Te rugăm să încerci din nou.";
            }
            IdentityError::Api { status, .. } => *status,
        };
        match self.code() {
            Some("otp_expired") => "Link invalid sau expirat.",
            Some("email_not_confirmed") => "Adresa de email nu a fost încă confirmată.",
            Some("invalid_credentials" | "invalid_grant") => "Email sau parolă incorecte.",
            Some("over_email_send_rate_limit" | "over_request_rate_limit") => {
                "Ai făcut prea multe cereri. Te rugăm să încerci din nou peste un minut."
            }
            Some("user_not_found") => "Nu există niciun cont cu această adresă de email.",
            _ if status == StatusCode::TOO_MANY_REQUESTS => {
                "Ai făcut prea multe cereri. Te rugăm să încerci din nou peste un minut."
            }
            _ if status.is_server_error() => {
                "Serviciul de autentificare nu este disponibil momentan. Te rugăm să încerci din nou."
            }
            _ => "Cererea a fost refuzată de serviciul de autentificare.",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
}

/// Provider default for access tokens, used when nothing else says otherwise.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

impl Session {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Fill in `expires_at` from the access token's `exp` claim, or from the
    /// default lifetime when the token carries none.
    fn with_expiry(mut self, now: i64) -> Self {
        if self.expires_at.is_none() {
            self.expires_at = Some(
                token_expiry(&self.access_token).unwrap_or(now + DEFAULT_TOKEN_LIFETIME_SECS),
            );
        }
        self
    }
}

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// `exp` claim of a JWT access token. The signature is not checked; the
/// provider has already vouched for the token.
pub fn token_expiry(access_token: &str) -> Option<i64> {
    let payload = access_token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice::<Claims>(&bytes).ok()?.exp
}

/// Both error body shapes the provider uses.
#[derive(Deserialize, Default)]
struct ErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_code: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Client for a GoTrue-compatible REST API (`{base_url}/auth/v1`).
pub struct IdentityClient {
    pub base_url: String,
    pub anon_key: String,
    http: Client,
}

impl IdentityClient {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            http: Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn request(&self, builder: RequestBuilder, bearer: Option<&str>) -> RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer.unwrap_or(&self.anon_key))
    }

    async fn check(res: Response) -> Result<Response, IdentityError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let body: ErrorBody = res.json().await.unwrap_or_default();
        let code = body.error_code.or(body.error);
        let message = body
            .msg
            .or(body.message)
            .or(body.error_description)
            .or_else(|| code.clone())
            .unwrap_or_else(|| status.to_string());
        tracing::debug!(%status, ?code, %message, "identity provider returned an error");
        Err(IdentityError::Api {
            status,
            code,
            message,
        })
    }

    async fn read_session(res: Response) -> Result<Session, IdentityError> {
        let session: Session = Self::check(res).await?.json().await?;
        Ok(session.with_expiry(chrono::Utc::now().timestamp()))
    }

    pub async fn get_user(&self, access_token: &str) -> Result<User, IdentityError> {
        let res = self
            .request(self.http.get(self.endpoint("user")), Some(access_token))
            .send()
            .await?;
        Ok(Self::check(res).await?.json().await?)
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Session, IdentityError> {
        let res = self
            .request(
                self.http
                    .post(self.endpoint("token"))
                    .query(&[("grant_type", "refresh_token")]),
                None,
            )
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        Self::read_session(res).await
    }

    /// Adopt a session handed over in a confirmation link. The access token
    /// is checked with the provider; if it is no longer accepted the refresh
    /// token is exchanged for a new pair. `expires_at` is the link's own
    /// expiry when it carried one.
    pub async fn set_session(
        &self,
        access_token: &str,
        refresh_token: &str,
        expires_at: Option<i64>,
    ) -> Result<Session, IdentityError> {
        match self.get_user(access_token).await {
            Ok(user) => Ok(Session {
                access_token: access_token.to_string(),
                refresh_token: refresh_token.to_string(),
                expires_at,
                user,
            }
            .with_expiry(chrono::Utc::now().timestamp())),
            Err(e) if e.is_auth_rejection() => {
                tracing::info!("access token refused, refreshing session");
                self.refresh_session(refresh_token).await
            }
            Err(e) => Err(e),
        }
    }

    pub async fn verify_otp(
        &self,
        token_hash: &str,
        kind: OtpType,
    ) -> Result<Session, IdentityError> {
        let res = self
            .request(self.http.post(self.endpoint("verify")), None)
            .json(&json!({ "type": kind, "token_hash": token_hash }))
            .send()
            .await?;
        Self::read_session(res).await
    }

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, IdentityError> {
        let res = self
            .request(
                self.http
                    .post(self.endpoint("token"))
                    .query(&[("grant_type", "password")]),
                None,
            )
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Self::read_session(res).await
    }

    pub async fn resend_signup(&self, email: &str, redirect_to: &str) -> Result<(), IdentityError> {
        let res = self
            .request(
                self.http
                    .post(self.endpoint("resend"))
                    .query(&[("redirect_to", redirect_to)]),
                None,
            )
            .json(&json!({ "type": OtpType::Signup, "email": email }))
            .send()
            .await?;
        Self::check(res).await?;
        Ok(())
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let res = self
            .request(self.http.post(self.endpoint("logout")), Some(access_token))
            .send()
            .await?;
        Self::check(res).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status: u16, code: Option<&str>) -> IdentityError {
        IdentityError::Api {
            status: StatusCode::from_u16(status).unwrap(),
            code: code.map(str::to_string),
            message: "raw provider text".to_string(),
        }
    }

    #[test]
    fn reads_exp_claim() {
        // {"alg":"HS256"}.{"sub":"user-1","exp":1900000000}.sig
        let token = "eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiJ1c2VyLTEiLCJleHAiOjE5MDAwMDAwMDB9.c2ln";
        assert_eq!(token_expiry(token), Some(1_900_000_000));
        assert_eq!(token_expiry("opaque"), None);
    }

    #[test]
    fn opaque_token_gets_default_lifetime() {
        let session = Session {
            access_token: "opaque".into(),
            refresh_token: "r".into(),
            expires_at: None,
            user: User {
                id: "user-1".into(),
                email: None,
                email_confirmed_at: None,
            },
        }
        .with_expiry(1_000);

        assert_eq!(session.expires_at, Some(1_000 + DEFAULT_TOKEN_LIFETIME_SECS));
    }

    #[test]
    fn user_messages_hide_provider_text() {
        assert_eq!(
            api_error(400, Some("email_not_confirmed")).user_message(),
            "Adresa de email nu a fost încă confirmată."
        );
        assert!(api_error(429, None).user_message().contains("prea multe cereri"));
        assert!(api_error(502, None).user_message().contains("nu este disponibil"));
        assert!(!api_error(400, Some("weird")).user_message().contains("raw provider text"));
    }
}
