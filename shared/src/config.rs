use std::env;
use thiserror::Error;
use url::Url;

pub const SUPABASE_URL_VAR: &str = "SUPABASE_URL";
pub const SERVICE_ROLE_KEY_VAR: &str = "SUPABASE_SERVICE_ROLE_KEY";

// Defaults used when the optional variables are not set
const DEFAULT_TABLE: &str = "recipes";
const DEFAULT_CHANNEL: &str = "recipes-channel";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Connection settings for the hosted database
#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub url: Url,
    pub service_role_key: String,
    pub table: String,
    pub channel: String,
}

impl StoreConfig {
    /// Reads the store configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::Missing(name.to_string()))
        };

        let raw_url = required(SUPABASE_URL_VAR)?;
        let url = Url::parse(&raw_url).map_err(|e| ConfigError::Invalid {
            var: SUPABASE_URL_VAR.to_string(),
            reason: e.to_string(),
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Invalid {
                var: SUPABASE_URL_VAR.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        let service_role_key = required(SERVICE_ROLE_KEY_VAR)?;

        let table = lookup("RECIPES_TABLE")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TABLE.to_string());
        let channel = lookup("RECIPES_CHANNEL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CHANNEL.to_string());

        Ok(Self {
            url,
            service_role_key,
            table,
            channel,
        })
    }

    /// REST endpoint for the configured table
    pub fn rest_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.url.as_str().trim_end_matches('/'),
            self.table
        )
    }

    /// Websocket endpoint of the realtime server
    pub fn realtime_url(&self) -> String {
        let base = self.url.as_str().trim_end_matches('/');
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            base.to_string()
        };
        format!(
            "{}/realtime/v1/websocket?apikey={}&vsn=1.0.0",
            ws_base, self.service_role_key
        )
    }
}

/// Port for the local (non-Lambda) server
pub fn local_port(default_port: u16) -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(default_port)
}

/// True when running inside the Lambda runtime
pub fn is_lambda() -> bool {
    env::var("AWS_LAMBDA_FUNCTION_NAME").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_missing_url_is_fatal() {
        let result = StoreConfig::from_lookup(lookup(&[(SERVICE_ROLE_KEY_VAR, "key")]));
        assert_eq!(
            result.unwrap_err(),
            ConfigError::Missing(SUPABASE_URL_VAR.to_string())
        );
    }

    #[test]
    fn test_missing_key_is_fatal() {
        let result = StoreConfig::from_lookup(lookup(&[(
            SUPABASE_URL_VAR,
            "https://abc.supabase.co",
        )]));
        assert_eq!(
            result.unwrap_err(),
            ConfigError::Missing(SERVICE_ROLE_KEY_VAR.to_string())
        );
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let result = StoreConfig::from_lookup(lookup(&[
            (SUPABASE_URL_VAR, "https://abc.supabase.co"),
            (SERVICE_ROLE_KEY_VAR, "   "),
        ]));
        assert!(matches!(result, Err(ConfigError::Missing(_))));
    }

    #[test]
    fn test_invalid_url() {
        let result = StoreConfig::from_lookup(lookup(&[
            (SUPABASE_URL_VAR, "not a url"),
            (SERVICE_ROLE_KEY_VAR, "key"),
        ]));
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));

        let result = StoreConfig::from_lookup(lookup(&[
            (SUPABASE_URL_VAR, "ftp://abc.supabase.co"),
            (SERVICE_ROLE_KEY_VAR, "key"),
        ]));
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_defaults_and_endpoints() {
        let config = StoreConfig::from_lookup(lookup(&[
            (SUPABASE_URL_VAR, "https://abc.supabase.co/"),
            (SERVICE_ROLE_KEY_VAR, "secret"),
        ]))
        .unwrap();

        assert_eq!(config.table, "recipes");
        assert_eq!(config.channel, "recipes-channel");
        assert_eq!(config.rest_url(), "https://abc.supabase.co/rest/v1/recipes");
        assert_eq!(
            config.realtime_url(),
            "wss://abc.supabase.co/realtime/v1/websocket?apikey=secret&vsn=1.0.0"
        );
    }

    #[test]
    fn test_overrides() {
        let config = StoreConfig::from_lookup(lookup(&[
            (SUPABASE_URL_VAR, "http://127.0.0.1:54321"),
            (SERVICE_ROLE_KEY_VAR, "secret"),
            ("RECIPES_TABLE", "dishes"),
            ("RECIPES_CHANNEL", "dishes-channel"),
        ]))
        .unwrap();

        assert_eq!(config.rest_url(), "http://127.0.0.1:54321/rest/v1/dishes");
        assert_eq!(config.channel, "dishes-channel");
        assert!(config.realtime_url().starts_with("ws://127.0.0.1:54321/"));
    }
}
