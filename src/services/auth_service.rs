use std::time::Duration;

use serde::Deserialize;

use crate::error::{ AppError, Result };

/// Identity resolved from a bearer credential at the request boundary.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: String,
    pub email_verified: bool,
}

#[derive(Debug, Deserialize)]
struct IdentityUserResponse {
    id: String,
    email: Option<String>,
    email_confirmed_at: Option<String>,
}

/// Resolves bearer tokens against the external identity endpoint.
pub struct AuthService {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl AuthService {
    pub fn new(api_url: String, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client
                ::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            api_url,
            api_key,
        }
    }

    /// Resolve a bearer token to a user identity. Any failure along the
    /// way maps to `Unauthorized`; callers never see provider details.
    pub async fn authenticate(&self, bearer_token: &str) -> Result<AuthenticatedUser> {
        if bearer_token.is_empty() {
            return Err(AppError::Unauthorized);
        }

        let mut request = self.client
            .get(format!("{}/user", self.api_url))
            .bearer_auth(bearer_token);
        if let Some(api_key) = self.api_key.as_deref() {
            request = request.header("apikey", api_key);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!("identity request failed: {}", e);
            AppError::Unauthorized
        })?;

        if !response.status().is_success() {
            return Err(AppError::Unauthorized);
        }

        let user: IdentityUserResponse = response
            .json().await
            .map_err(|_| AppError::Unauthorized)?;

        let email = user.email.filter(|e| !e.is_empty()).ok_or(AppError::Unauthorized)?;

        Ok(AuthenticatedUser {
            id: user.id,
            email,
            email_verified: user.email_confirmed_at.is_some(),
        })
    }
}

/// Extract the token from an `Authorization: Bearer ...` header value.
pub fn bearer_token(header_value: Option<&str>) -> Option<&str> {
    header_value?.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(Some("Bearer abc123")), Some("abc123"));
        assert_eq!(bearer_token(Some("Basic abc123")), None);
        assert_eq!(bearer_token(Some("Bearer ")), None);
        assert_eq!(bearer_token(None), None);
    }
}
