use std::env;

use crate::services::lifecycle::{BillPolicy, StatusPolicy};
use crate::services::receipt::ShopProfile;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum IdentityProviderKind {
    #[default]
    Static,
    Remote,
}

impl IdentityProviderKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "static" => Some(IdentityProviderKind::Static),
            "remote" => Some(IdentityProviderKind::Remote),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub session_secret: String,
    pub session_ttl_hours: i64,
    pub identity_provider: IdentityProviderKind,
    pub admin_email: String,
    pub admin_password: String,
    pub identity_api_key: String,
    pub identity_url: String,
    pub bill_policy: BillPolicy,
    pub status_policy: StatusPolicy,
    pub shop_name: String,
    pub shop_address: String,
    pub shop_phone: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "garagebook.db".to_string()),
            session_secret: env::var("SESSION_SECRET").unwrap_or_default(),
            session_ttl_hours: env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(12),
            identity_provider: parse_choice(
                "IDENTITY_PROVIDER",
                env::var("IDENTITY_PROVIDER").ok(),
                IdentityProviderKind::parse,
            )?,
            admin_email: env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@localhost".to_string()),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_default(),
            identity_api_key: env::var("IDENTITY_API_KEY").unwrap_or_default(),
            identity_url: env::var("IDENTITY_URL")
                .unwrap_or_else(|_| "https://identitytoolkit.googleapis.com".to_string()),
            bill_policy: parse_choice("BILL_POLICY", env::var("BILL_POLICY").ok(), BillPolicy::parse)?,
            status_policy: parse_choice(
                "STATUS_POLICY",
                env::var("STATUS_POLICY").ok(),
                StatusPolicy::parse,
            )?,
            shop_name: env::var("SHOP_NAME").unwrap_or_else(|_| "Vehicle Service Centre".to_string()),
            shop_address: env::var("SHOP_ADDRESS").unwrap_or_default(),
            shop_phone: env::var("SHOP_PHONE").unwrap_or_default(),
        })
    }

    pub fn shop(&self) -> ShopProfile {
        ShopProfile {
            name: self.shop_name.clone(),
            address: self.shop_address.clone(),
            phone: self.shop_phone.clone(),
        }
    }
}

/// Unset or blank falls back to the default; anything else must parse.
fn parse_choice<T: Default>(
    name: &str,
    raw: Option<String>,
    parse: impl Fn(&str) -> Option<T>,
) -> anyhow::Result<T> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(T::default()),
        Some(value) => match parse(value) {
            Some(choice) => Ok(choice),
            None => anyhow::bail!("unknown {name} value: {value:?}"),
        },
    }
}
