//! Container options.
//!
//! Options can be built in code, read from the environment, or (with the
//! `config` feature) deserialized from JSON.

use std::env;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::{ServantError, ServantResult};

/// Environment variable holding the container name.
pub const ENV_NAME: &str = "SERVANT_NAME";
/// Environment variable toggling the undisposed-drop warning.
pub const ENV_WARN_ON_UNDISPOSED_DROP: &str = "SERVANT_WARN_ON_UNDISPOSED_DROP";

/// Options for a [`Servant`](crate::Servant) container.
///
/// # Examples
///
/// ```
/// use servant::{Servant, ServantOptions};
///
/// let options = ServantOptions::default()
///     .with_name("Billing")
///     .warn_on_undisposed_drop(false);
/// let servant = Servant::with_options(options);
/// assert_eq!(servant.name(), "Billing");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ServantOptions {
    /// Name reported in disposed-container errors and log events.
    pub name: String,
    /// Log a warning when the container is dropped while disposable
    /// singletons are still alive.
    pub warn_on_undisposed_drop: bool,
}

impl Default for ServantOptions {
    fn default() -> Self {
        Self {
            name: "Servant".to_string(),
            warn_on_undisposed_drop: true,
        }
    }
}

impl ServantOptions {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn warn_on_undisposed_drop(mut self, warn: bool) -> Self {
        self.warn_on_undisposed_drop = warn;
        self
    }

    /// Reads options from `SERVANT_*` environment variables, falling back to
    /// defaults for unset variables.
    pub fn from_env() -> ServantResult<Self> {
        let mut options = Self::default();

        if let Ok(name) = env::var(ENV_NAME) {
            if name.trim().is_empty() {
                return Err(ServantError::Config(format!("{} must not be empty", ENV_NAME)));
            }
            options.name = name;
        }

        if let Ok(raw) = env::var(ENV_WARN_ON_UNDISPOSED_DROP) {
            options.warn_on_undisposed_drop = parse_bool(&raw).ok_or_else(|| {
                ServantError::Config(format!(
                    "{} must be a boolean, got \"{}\"",
                    ENV_WARN_ON_UNDISPOSED_DROP, raw
                ))
            })?;
        }

        Ok(options)
    }

    /// Parses options from JSON; missing fields take their defaults.
    #[cfg(feature = "config")]
    pub fn from_json_str(json: &str) -> ServantResult<Self> {
        serde_json::from_str(json).map_err(|e| ServantError::Config(e.to_string()))
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
