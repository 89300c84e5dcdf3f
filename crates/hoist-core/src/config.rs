//! Layered configuration for extraction requests.
//!
//! Precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (`HOIST_VAR_NAME`, `HOIST_LANG_STD`)
//! 3. Defaults
//!
//! The language standard has no default here: when neither layer sets it, the
//! language options recorded in the AST snapshot are used.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default name of the extracted variable.
pub const DEFAULT_VARIABLE_NAME: &str = "placeholder";

/// Environment variable overriding the variable name.
pub const ENV_VAR_NAME: &str = "HOIST_VAR_NAME";

/// Environment variable overriding the language standard.
pub const ENV_LANG_STD: &str = "HOIST_LANG_STD";

// ============================================================================
// Configuration Sources
// ============================================================================

/// Configuration value source (for precedence tracking).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    /// Built-in default value.
    Default = 0,
    /// From environment variable.
    EnvVar = 1,
    /// From CLI flag (highest precedence).
    CliFlag = 2,
}

/// A configuration value with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValue<T> {
    /// The actual value.
    pub value: T,
    /// Where the value came from.
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    /// Create a new config value with the given source.
    pub fn new(value: T, source: ConfigSource) -> Self {
        ConfigValue { value, source }
    }

    /// Merge with another value, preferring higher precedence.
    pub fn merge(self, other: Self) -> Self {
        if other.source >= self.source {
            other
        } else {
            self
        }
    }
}

// ============================================================================
// Language Standard
// ============================================================================

/// Source language dialect of the translation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LanguageStandard {
    #[serde(rename = "c")]
    C,
    #[serde(rename = "objc")]
    ObjC,
    #[serde(rename = "c++98")]
    Cxx98,
    #[serde(rename = "c++11")]
    Cxx11,
    #[serde(rename = "c++14")]
    Cxx14,
    #[serde(rename = "c++17")]
    Cxx17,
    #[serde(rename = "c++20")]
    Cxx20,
}

impl LanguageStandard {
    /// Whether the dialect has `auto` type deduction for local variables.
    pub fn deduces_auto(self) -> bool {
        self >= LanguageStandard::Cxx11
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LanguageStandard::C => "c",
            LanguageStandard::ObjC => "objc",
            LanguageStandard::Cxx98 => "c++98",
            LanguageStandard::Cxx11 => "c++11",
            LanguageStandard::Cxx14 => "c++14",
            LanguageStandard::Cxx17 => "c++17",
            LanguageStandard::Cxx20 => "c++20",
        }
    }
}

impl fmt::Display for LanguageStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageStandard {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace("cxx", "c++");
        let normalized = match normalized.strip_prefix("gnu") {
            Some(rest) => format!("c{}", rest),
            None => normalized,
        };
        match normalized.as_str() {
            "c" | "c89" | "c99" | "c11" | "c17" => Ok(LanguageStandard::C),
            "objc" | "objective-c" => Ok(LanguageStandard::ObjC),
            "c++98" | "c++03" => Ok(LanguageStandard::Cxx98),
            "c++11" => Ok(LanguageStandard::Cxx11),
            "c++14" => Ok(LanguageStandard::Cxx14),
            "c++17" => Ok(LanguageStandard::Cxx17),
            "c++20" | "c++23" => Ok(LanguageStandard::Cxx20),
            _ => Err(format!("unknown language standard '{}'", s)),
        }
    }
}

// ============================================================================
// Configuration Resolution
// ============================================================================

/// CLI configuration overrides.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// --name flag.
    pub variable_name: Option<String>,
    /// --std flag.
    pub standard: Option<LanguageStandard>,
}

/// Resolved configuration with precedence information.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Name given to the extracted variable.
    pub variable_name: ConfigValue<String>,
    /// Language standard override, if any layer set one.
    pub standard: Option<ConfigValue<LanguageStandard>>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        ResolvedConfig {
            variable_name: ConfigValue::new(
                DEFAULT_VARIABLE_NAME.to_string(),
                ConfigSource::Default,
            ),
            standard: None,
        }
    }
}

impl ResolvedConfig {
    /// Resolve configuration from the process environment and CLI flags.
    pub fn resolve(cli_overrides: &CliOverrides) -> Self {
        Self::resolve_with_env(cli_overrides, |key| std::env::var(key).ok())
    }

    /// Resolve configuration with an explicit environment lookup.
    pub fn resolve_with_env(
        cli_overrides: &CliOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let mut config = ResolvedConfig::default();
        config.apply_env_vars(env);
        config.apply_cli_overrides(cli_overrides);
        config
    }

    fn apply_env_vars(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(name) = env(ENV_VAR_NAME).filter(|n| !n.is_empty()) {
            self.variable_name = self
                .variable_name
                .clone()
                .merge(ConfigValue::new(name, ConfigSource::EnvVar));
        }

        if let Some(raw) = env(ENV_LANG_STD) {
            match raw.parse::<LanguageStandard>() {
                Ok(standard) => {
                    self.standard = Some(ConfigValue::new(standard, ConfigSource::EnvVar));
                }
                Err(err) => warn!("ignoring {}: {}", ENV_LANG_STD, err),
            }
        }
    }

    fn apply_cli_overrides(&mut self, overrides: &CliOverrides) {
        if let Some(ref name) = overrides.variable_name {
            self.variable_name = ConfigValue::new(name.clone(), ConfigSource::CliFlag);
        }

        if let Some(standard) = overrides.standard {
            self.standard = Some(ConfigValue::new(standard, ConfigSource::CliFlag));
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
