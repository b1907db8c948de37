use std::net::SocketAddr;
use std::time::Duration;

use vaultfolio_core::constants::DEFAULT_PRICE_HISTORY_LIMIT;
use vaultfolio_core::settings::{PlatformSettings, WithdrawalPolicy};

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8088";
const DEFAULT_DB_PATH: &str = "./db/app.db";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Server configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    /// Recipient of admin-facing notifications.
    pub admin_email: Option<String>,
    pub reserve_withdrawals: bool,
    pub price_history_limit: usize,
    /// Empty means same-origin only.
    pub cors_allow_origins: Vec<String>,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let listen_addr = env_or("VF_LISTEN_ADDR", DEFAULT_LISTEN_ADDR)
            .parse()
            .unwrap_or_else(|_| {
                tracing::warn!(
                    "Invalid VF_LISTEN_ADDR, falling back to {}",
                    DEFAULT_LISTEN_ADDR
                );
                SocketAddr::from(([0, 0, 0, 0], 8088))
            });

        let admin_email = std::env::var("VF_ADMIN_EMAIL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let cors_allow_origins = std::env::var("VF_CORS_ALLOW_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            listen_addr,
            db_path: env_or("VF_DB_PATH", DEFAULT_DB_PATH),
            admin_email,
            reserve_withdrawals: parse_bool(std::env::var("VF_RESERVE_WITHDRAWALS").ok()),
            price_history_limit: parse_number(
                "VF_PRICE_HISTORY_LIMIT",
                DEFAULT_PRICE_HISTORY_LIMIT,
            ),
            cors_allow_origins,
            request_timeout: Duration::from_millis(parse_number(
                "VF_REQUEST_TIMEOUT_MS",
                DEFAULT_REQUEST_TIMEOUT_MS,
            )),
        }
    }

    /// Tunables handed to the core services.
    pub fn platform_settings(&self) -> PlatformSettings {
        PlatformSettings {
            admin_email: self.admin_email.clone(),
            withdrawal_policy: WithdrawalPolicy {
                reserve_on_request: self.reserve_withdrawals,
            },
            price_history_limit: self.price_history_limit,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_bool(value: Option<String>) -> bool {
    matches!(
        value.as_deref().map(str::trim).map(str::to_ascii_lowercase).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}

fn parse_number<T: std::str::FromStr + std::fmt::Display + Copy>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {}={:?}, using {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool(Some("true".to_string())));
        assert!(parse_bool(Some(" YES ".to_string())));
        assert!(parse_bool(Some("1".to_string())));
        assert!(!parse_bool(Some("off".to_string())));
        assert!(!parse_bool(None));
    }

    #[test]
    fn test_platform_settings_carry_withdrawal_policy() {
        let config = Config {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            db_path: "test.db".to_string(),
            admin_email: Some("ops@example.com".to_string()),
            reserve_withdrawals: true,
            price_history_limit: 10,
            cors_allow_origins: vec![],
            request_timeout: Duration::from_secs(1),
        };
        let settings = config.platform_settings();
        assert!(settings.withdrawal_policy.reserve_on_request);
        assert_eq!(settings.price_history_limit, 10);
        assert_eq!(settings.admin_email.as_deref(), Some("ops@example.com"));
    }
}
