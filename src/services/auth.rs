use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{NaiveDateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: String,
}

/// Checks admin credentials. `Ok(None)` means the credentials were rejected.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> anyhow::Result<Option<Identity>>;
}

/// A single admin account taken from configuration.
pub struct StaticIdentityProvider {
    email: String,
    password: String,
}

impl StaticIdentityProvider {
    pub fn new(email: String, password: String) -> Self {
        Self { email, password }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> anyhow::Result<Option<Identity>> {
        if self.password.is_empty() {
            return Ok(None);
        }
        if email.trim().eq_ignore_ascii_case(&self.email) && password == self.password {
            Ok(Some(Identity {
                uid: "admin".to_string(),
                email: self.email.clone(),
            }))
        } else {
            Ok(None)
        }
    }
}

/// Email/password sign-in against an Identity Toolkit compatible REST endpoint.
pub struct RemoteIdentityProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    email: String,
}

impl RemoteIdentityProvider {
    pub fn new(api_key: String, base_url: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build identity provider client")?;
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl IdentityProvider for RemoteIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> anyhow::Result<Option<Identity>> {
        let url = format!("{}/v1/accounts:signInWithPassword", self.base_url);

        let res = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }))
            .send()
            .await
            .context("failed to reach identity provider")?;

        // Wrong email or password comes back as a 400
        if res.status() == reqwest::StatusCode::BAD_REQUEST {
            return Ok(None);
        }

        let body: SignInResponse = res
            .error_for_status()
            .context("identity provider returned error")?
            .json()
            .await
            .context("failed to parse identity provider response")?;

        Ok(Some(Identity {
            uid: body.local_id,
            email: body.email,
        }))
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub identity: Identity,
    pub expires_at: NaiveDateTime,
}

/// Longest session lifetime accepted from configuration, one year.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Signed-in admin sessions. Created at startup and injected through the router state;
/// sessions are added on sign-in and removed on sign-out or expiry.
///
/// Tokens are `<session id>.<hmac>`, so a guessed or tampered id is rejected before
/// the session table is consulted.
pub struct AuthContext {
    mac: Hmac<Sha1>,
    ttl: chrono::Duration,
    sessions: Mutex<HashMap<String, Session>>,
}

impl AuthContext {
    pub fn new(secret: &str, ttl_hours: i64) -> anyhow::Result<Self> {
        let mac = Hmac::<Sha1>::new_from_slice(secret.as_bytes())
            .map_err(|e| anyhow::anyhow!("invalid session secret: {e}"))?;
        Ok(Self {
            mac,
            ttl: chrono::Duration::hours(ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS)),
            sessions: Mutex::new(HashMap::new()),
        })
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Starts a session and returns its token.
    pub fn sign_in(&self, identity: Identity) -> String {
        let session_id = uuid::Uuid::new_v4().simple().to_string();
        let token = format!("{session_id}.{}", self.sign(&session_id));
        let session = Session {
            identity,
            expires_at: Utc::now().naive_utc() + self.ttl,
        };

        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Utc::now().naive_utc();
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(session_id, session);
        token
    }

    pub fn session(&self, token: &str) -> Option<Session> {
        let session_id = self.verify(token)?;
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);

        match sessions.get(session_id) {
            Some(session) if session.expires_at > Utc::now().naive_utc() => Some(session.clone()),
            Some(_) => {
                sessions.remove(session_id);
                None
            }
            None => None,
        }
    }

    pub fn sign_out(&self, token: &str) -> bool {
        let Some(session_id) = self.verify(token) else {
            return false;
        };
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session_id)
            .is_some()
    }

    fn sign(&self, session_id: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(session_id.as_bytes());
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }

    fn verify<'a>(&self, token: &'a str) -> Option<&'a str> {
        let (session_id, signature) = token.split_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;
        let mut mac = self.mac.clone();
        mac.update(session_id.as_bytes());
        mac.verify_slice(&signature).ok()?;
        Some(session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            uid: "admin".to_string(),
            email: "owner@example.com".to_string(),
        }
    }

    #[test]
    fn test_session_round_trip_and_sign_out() {
        let auth = AuthContext::new("secret", 12).unwrap();
        let token = auth.sign_in(identity());

        let session = auth.session(&token).unwrap();
        assert_eq!(session.identity, identity());

        assert!(auth.sign_out(&token));
        assert!(auth.session(&token).is_none());
        assert!(!auth.sign_out(&token));
    }

    #[test]
    fn test_tampered_or_foreign_tokens_are_rejected() {
        let auth = AuthContext::new("secret", 12).unwrap();
        let token = auth.sign_in(identity());
        let (id, _) = token.split_once('.').unwrap();

        assert!(auth.session(id).is_none());
        assert!(auth.session(&format!("{id}.AAAA")).is_none());
        assert!(auth.session("garbage").is_none());

        let other = AuthContext::new("other-secret", 12).unwrap();
        assert!(other.session(&token).is_none());
    }

    #[test]
    fn test_ttl_is_clamped() {
        let auth = AuthContext::new("secret", 10_000_000_000).unwrap();
        assert_eq!(auth.ttl_seconds(), MAX_SESSION_TTL_HOURS * 3600);
        let token = auth.sign_in(identity());
        assert!(auth.session(&token).is_some());

        let auth = AuthContext::new("secret", -3).unwrap();
        assert_eq!(auth.ttl_seconds(), 3600);
    }

    #[tokio::test]
    async fn test_static_provider() {
        let provider =
            StaticIdentityProvider::new("owner@example.com".to_string(), "hunter22".to_string());

        let ok = provider.sign_in("Owner@Example.com", "hunter22").await.unwrap();
        assert_eq!(ok.unwrap().email, "owner@example.com");
        assert!(provider.sign_in("owner@example.com", "nope").await.unwrap().is_none());

        let disabled = StaticIdentityProvider::new("owner@example.com".to_string(), String::new());
        assert!(disabled.sign_in("owner@example.com", "").await.unwrap().is_none());
    }
}
