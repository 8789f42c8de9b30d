//! Generator configuration
//!
//! Options are read once at construction. They can come from a TOML document
//! or from flat `prefix.key = value` properties as handed over by a host tool.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{SynthesisError, SynthesisResult};

/// Default property prefix
pub const DEFAULT_PREFIX: &str = "symtest";

/// Verbosity of assertion failure messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    /// No message argument on assertions
    #[default]
    None,
    /// Names the method under test
    #[serde(alias = "simple")]
    Short,
    /// Additionally lists every resolved argument
    Full,
}

impl FromStr for MessageLevel {
    type Err = SynthesisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "short" | "simple" => Ok(Self::Short),
            "full" => Ok(Self::Full),
            other => Err(SynthesisError::Config(format!("unknown message level '{}'", other))),
        }
    }
}

impl fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Short => "short",
            Self::Full => "full",
        })
    }
}

/// Test generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Registry name of the formatter
    #[serde(default = "default_formatter")]
    pub formatter: String,

    /// Package declaration of the generated unit
    #[serde(default)]
    pub package: Option<String>,

    /// Name of the generated test class
    #[serde(default = "default_class_name")]
    pub class_name: String,

    #[serde(default)]
    pub message: MessageLevel,

    /// Abandon a branch once its leaf has been turned into a test
    #[serde(default)]
    pub optimize: bool,

    /// Resolve fully symbolic arrays instead of skipping them
    #[serde(default)]
    pub symbolic_arrays: bool,
}

fn default_formatter() -> String {
    "junit5".to_string()
}

fn default_class_name() -> String {
    "Testcases".to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            formatter: default_formatter(),
            package: None,
            class_name: default_class_name(),
            message: MessageLevel::None,
            optimize: false,
            symbolic_arrays: false,
        }
    }
}

impl GeneratorConfig {
    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(source: &str) -> SynthesisResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| SynthesisError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read flat properties such as `symtest.formatter = junit5`.
    ///
    /// The prefix can be replaced through `symtest.abbreviation`, so a host
    /// may configure `tg.formatter` after setting `symtest.abbreviation = tg`.
    /// An unrecognised message level falls back to `none`.
    pub fn from_properties(properties: &HashMap<String, String>) -> SynthesisResult<Self> {
        let abbreviation_key = format!("{}.abbreviation", DEFAULT_PREFIX);
        let prefix = properties
            .get(&abbreviation_key)
            .map(String::as_str)
            .unwrap_or(DEFAULT_PREFIX);
        let get = |key: &str| properties.get(&format!("{}.{}", prefix, key));

        let mut config = Self::default();

        if let Some(formatter) = get("formatter") {
            config.formatter = formatter.trim().to_string();
        }
        if let Some(package) = get("formatter.package") {
            let package = package.trim();
            if !package.is_empty() {
                config.package = Some(package.to_string());
            }
        }
        if let Some(class_name) = get("formatter.class_name") {
            config.class_name = class_name.trim().to_string();
        }
        if let Some(message) = get("formatter.message") {
            config.message = message.trim().parse().unwrap_or_else(|e| {
                warn!("{}, falling back to 'none'", e);
                MessageLevel::None
            });
        }
        if let Some(optimize) = get("optimize") {
            config.optimize = parse_bool(prefix, "optimize", optimize)?;
        }
        if let Some(arrays) = get("symbolic_arrays") {
            config.symbolic_arrays = parse_bool(prefix, "symbolic_arrays", arrays)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values no formatter could work with
    pub fn validate(&self) -> SynthesisResult<()> {
        if self.formatter.is_empty() {
            return Err(SynthesisError::Config("formatter name is empty".to_string()));
        }
        if !is_java_identifier(&self.class_name) {
            return Err(SynthesisError::Config(format!(
                "'{}' is not a valid class name",
                self.class_name
            )));
        }
        if let Some(package) = &self.package {
            if !package.split('.').all(is_java_identifier) {
                return Err(SynthesisError::Config(format!(
                    "'{}' is not a valid package name",
                    package
                )));
            }
        }
        Ok(())
    }
}

fn parse_bool(prefix: &str, key: &str, value: &str) -> SynthesisResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(SynthesisError::Config(format!(
            "{}.{}: expected a boolean, got '{}'",
            prefix, key, other
        ))),
    }
}

fn is_java_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
