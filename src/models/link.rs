use std::collections::HashMap;

/// Decoded `key=value` pairs from a fragment or query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlParams(HashMap<String, String>);

impl UrlParams {
    /// Parse a form-urlencoded string, ignoring a leading `#` or `?`.
    /// Empty values are dropped so they read the same as missing keys.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim_start_matches(&['#', '?'][..]);
        Self(
            url::form_urlencoded::parse(raw.as_bytes())
                .filter(|(_, v)| !v.is_empty())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// `type` values the provider puts in the fragment of a confirmation link.
#[derive(Debug, Clone, PartialEq)]
pub enum FragmentType {
    Signup,
    SignupEmailConfirmation,
    Recovery,
    Other(String),
}

impl FragmentType {
    fn parse(raw: &str) -> Self {
        match raw {
            "signup" => Self::Signup,
            "signup_email_confirmation" => Self::SignupEmailConfirmation,
            "recovery" => Self::Recovery,
            other => Self::Other(other.to_string()),
        }
    }

    /// True for the types that mean the email address is now confirmed.
    pub fn confirms_account(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

/// `type` values accepted next to a query `token`.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryType {
    EmailConfirm,
    Signup,
    Other(String),
}

impl QueryType {
    fn parse(raw: &str) -> Self {
        match raw {
            "email_confirm" => Self::EmailConfirm,
            "signup" => Self::Signup,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Session tokens handed over in the URL fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub kind: Option<FragmentType>,
    /// Unix seconds, when the link states it.
    pub expires_at: Option<i64>,
}

/// One-time token passed in the query string.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryToken {
    pub token: String,
    pub kind: Option<QueryType>,
}

/// Error the provider reported by redirecting back with `error_code` and/or
/// `error_description`.
#[derive(Debug, Clone, PartialEq)]
pub struct RedirectError {
    pub code: Option<String>,
    pub description: Option<String>,
}

impl RedirectError {
    fn from_params(params: &UrlParams) -> Option<Self> {
        let code = params.get("error_code").map(str::to_string);
        let description = params.get("error_description").map(str::to_string);
        if code.is_none() && description.is_none() {
            return None;
        }
        Some(Self { code, description })
    }

    pub fn is_expired(&self) -> bool {
        self.code.as_deref() == Some("otp_expired")
    }
}

/// Everything the confirmation page reads from its URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfirmParams {
    pub fragment: UrlParams,
    pub query: UrlParams,
}

impl ConfirmParams {
    pub fn from_url_parts(hash: &str, search: &str) -> Self {
        Self {
            fragment: UrlParams::parse(hash),
            query: UrlParams::parse(search),
        }
    }

    /// Both session tokens must be present; a lone access token is ignored.
    pub fn fragment_tokens(&self) -> Option<FragmentTokens> {
        Some(FragmentTokens {
            access_token: self.fragment.get("access_token")?.to_string(),
            refresh_token: self.fragment.get("refresh_token")?.to_string(),
            kind: self.fragment.get("type").map(FragmentType::parse),
            expires_at: self.fragment.get("expires_at").and_then(|v| v.parse().ok()),
        })
    }

    pub fn query_token(&self) -> Option<QueryToken> {
        Some(QueryToken {
            token: self.query.get("token")?.to_string(),
            kind: self.query.get("type").map(QueryType::parse),
        })
    }

    /// Provider error redirect, query string first.
    pub fn redirect_error(&self) -> Option<RedirectError> {
        RedirectError::from_params(&self.query)
            .or_else(|| RedirectError::from_params(&self.fragment))
    }
}
