//! Resolution of external resource identifiers.
//!
//! Every parameter a collector needs (executable, device address, sysfs
//! path...) comes from an explicit config value, then an environment
//! variable, then a built-in default. Resolution never fails.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Read access to environment variables.
pub trait EnvSource: Send + Sync {
    /// Value of `name`, or `None` when unset.
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        if name.is_empty() {
            return None;
        }
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// What to return when neither config nor environment provide a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Use the built-in default.
    #[default]
    Default,
    /// Use the environment variable's name itself, or the built-in default
    /// when no variable name is given. Matches the legacy telegraf plugins.
    EnvName,
}

/// Resolves parameters against a fixed [`EnvSource`].
#[derive(Clone)]
pub struct Resolver {
    policy: FallbackPolicy,
    env: Arc<dyn EnvSource>,
}

impl Resolver {
    /// Resolver over the process environment.
    pub fn new(policy: FallbackPolicy) -> Self {
        Self::with_env(policy, ProcessEnv)
    }

    /// Resolver over an explicit environment snapshot.
    pub fn with_env(policy: FallbackPolicy, env: impl EnvSource + 'static) -> Self {
        Self {
            policy,
            env: Arc::new(env),
        }
    }

    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    /// Resolve one parameter.
    ///
    /// A non-empty `config_value` wins unchanged; otherwise a non-empty
    /// `env_name` variable; otherwise the fallback policy decides.
    pub fn resolve(&self, config_value: &str, env_name: &str, builtin_default: &str) -> String {
        if !config_value.is_empty() {
            return config_value.to_string();
        }

        if let Some(value) = self.env.var(env_name).filter(|v| !v.is_empty()) {
            return value;
        }

        match self.policy {
            FallbackPolicy::EnvName if !env_name.is_empty() => env_name.to_string(),
            _ => builtin_default.to_string(),
        }
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(FallbackPolicy::Default)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
