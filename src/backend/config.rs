//! Backend connection settings parsed from environment variables.

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {var}: {raw}")]
    InvalidVar { var: &'static str, raw: String },
}

/// Connection settings for the hosted backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Base URL of the backend project, without a trailing slash.
    pub base_url: String,
    /// Project API key, sent as the `apikey` header on every request.
    pub anon_key: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl BackendConfig {
    /// Build config from process environment variables.
    ///
    /// Required: `BACKEND_URL`, `BACKEND_ANON_KEY`.
    /// Optional: `BACKEND_TIMEOUT_SECS` (default 10).
    ///
    /// # Errors
    ///
    /// Returns an error when a required variable is absent or a value does
    /// not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup. Seam for tests.
    ///
    /// # Errors
    ///
    /// Same contract as [`BackendConfig::from_env`].
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = get("BACKEND_URL")
            .map(|raw| raw.trim().trim_end_matches('/').to_owned())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingVar("BACKEND_URL"))?;
        let anon_key = get("BACKEND_ANON_KEY")
            .map(|raw| raw.trim().to_owned())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingVar("BACKEND_ANON_KEY"))?;
        let timeout_secs = match get("BACKEND_TIMEOUT_SECS") {
            None => DEFAULT_TIMEOUT_SECS,
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidVar { var: "BACKEND_TIMEOUT_SECS", raw })?,
        };

        Ok(Self { base_url, anon_key, timeout_secs })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
