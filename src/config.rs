use std::{env, path::PathBuf, str::FromStr};

use anyhow::{anyhow, Context};

use crate::{
    model::record_action::DEFAULT_SWIPE_THRESHOLD, notify::push_relay::DEFAULT_PUSH_RELAY_URL,
    store::remote::RemoteStoreConfig,
};

pub const DEFAULT_TABLE: &str = "formdatatwo";
pub const DEFAULT_PORT: u16 = 3000;

/// What a failed store call does to the client's view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Report the failure; nothing is shown as saved.
    Surface,
    /// Log the failure and carry on as if it had succeeded.
    Silent,
}

impl FromStr for FailurePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<FailurePolicy> {
        match s.to_ascii_lowercase().as_str() {
            "surface" => Ok(FailurePolicy::Surface),
            "silent" => Ok(FailurePolicy::Silent),
            other => Err(anyhow!("Invalid failure policy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreConfig {
    /// `None` keeps the table in memory.
    Local { path: Option<PathBuf> },
    Remote(RemoteStoreConfig),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub port: u16,
    pub store: StoreConfig,
    pub push_relay_url: String,
    pub failure_policy: FailurePolicy,
    pub swipe_threshold: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            port: DEFAULT_PORT,
            store: StoreConfig::Local { path: None },
            push_relay_url: String::from(DEFAULT_PUSH_RELAY_URL),
            failure_policy: FailurePolicy::Surface,
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<AppConfig> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<AppConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("NOTAS_PORT")
            .map(|p| p.parse::<u16>())
            .unwrap_or(Ok(DEFAULT_PORT))
            .context("NOTAS_PORT")?;

        let store = match (lookup("NOTAS_STORE_URL"), lookup("NOTAS_STORE_KEY")) {
            (Some(endpoint), Some(api_key)) => StoreConfig::Remote(RemoteStoreConfig {
                endpoint,
                api_key,
                table: lookup("NOTAS_STORE_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_owned()),
            }),
            (None, None) => StoreConfig::Local {
                path: lookup("NOTAS_SQLITE_PATH").map(PathBuf::from),
            },
            (Some(_), None) => Err(anyhow!("NOTAS_STORE_URL is set without NOTAS_STORE_KEY"))?,
            (None, Some(_)) => Err(anyhow!("NOTAS_STORE_KEY is set without NOTAS_STORE_URL"))?,
        };

        let push_relay_url =
            lookup("NOTAS_PUSH_URL").unwrap_or_else(|| DEFAULT_PUSH_RELAY_URL.to_owned());

        let failure_policy = lookup("NOTAS_FAILURE_POLICY")
            .map(|p| p.parse::<FailurePolicy>())
            .unwrap_or(Ok(FailurePolicy::Surface))
            .context("NOTAS_FAILURE_POLICY")?;

        let swipe_threshold = lookup("NOTAS_SWIPE_THRESHOLD")
            .map(|t| t.parse::<f64>())
            .unwrap_or(Ok(DEFAULT_SWIPE_THRESHOLD))
            .context("NOTAS_SWIPE_THRESHOLD")?;

        Ok(AppConfig {
            port,
            store,
            push_relay_url,
            failure_policy,
            swipe_threshold,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, path::PathBuf};

    use crate::store::remote::RemoteStoreConfig;

    use super::{AppConfig, FailurePolicy, StoreConfig};

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        assert_eq!(config(&[]).unwrap(), AppConfig::default());
    }

    #[test]
    fn remote_store() {
        let config = config(&[
            ("NOTAS_STORE_URL", "https://example.supabase.co"),
            ("NOTAS_STORE_KEY", "anon-key"),
        ])
        .unwrap();

        assert_eq!(
            config.store,
            StoreConfig::Remote(RemoteStoreConfig {
                endpoint: String::from("https://example.supabase.co"),
                api_key: String::from("anon-key"),
                table: String::from("formdatatwo"),
            })
        );
    }

    #[test]
    fn remote_store_needs_both_values() {
        let err = config(&[("NOTAS_STORE_URL", "https://example.supabase.co")]).unwrap_err();
        assert!(err.to_string().contains("without NOTAS_STORE_KEY"));

        let err = config(&[("NOTAS_STORE_KEY", "anon-key")]).unwrap_err();
        assert!(err.to_string().contains("without NOTAS_STORE_URL"));
    }

    #[test]
    fn local_store_path() {
        let config = config(&[("NOTAS_SQLITE_PATH", "/tmp/notas.db")]).unwrap();
        assert_eq!(
            config.store,
            StoreConfig::Local {
                path: Some(PathBuf::from("/tmp/notas.db"))
            }
        );
    }

    #[test]
    fn overrides() {
        let config = config(&[
            ("NOTAS_PORT", "8081"),
            ("NOTAS_FAILURE_POLICY", "Silent"),
            ("NOTAS_SWIPE_THRESHOLD", "-120"),
            ("NOTAS_PUSH_URL", "http://localhost:9000/push"),
        ])
        .unwrap();

        assert_eq!(config.port, 8081);
        assert_eq!(config.failure_policy, FailurePolicy::Silent);
        assert_eq!(config.swipe_threshold, -120.0);
        assert_eq!(config.push_relay_url, "http://localhost:9000/push");
    }

    #[test]
    fn invalid_values() {
        assert_eq!(
            config(&[("NOTAS_PORT", "http")]).unwrap_err().to_string(),
            "NOTAS_PORT"
        );
        assert_eq!(
            config(&[("NOTAS_FAILURE_POLICY", "loud")])
                .unwrap_err()
                .to_string(),
            "NOTAS_FAILURE_POLICY"
        );
    }
}
