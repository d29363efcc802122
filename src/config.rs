//! Interpreter configuration read from the environment.
use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::vm::{OverflowPolicy, VMOptions};

pub const MAX_STACK_SIZE_VAR: &str = "THIRTH_MAX_STACK_SIZE";
pub const OVERFLOW_VAR: &str = "THIRTH_OVERFLOW";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to parse env var {key} with value {value}: {message}")]
    InvalidEnv { key: String, value: String, message: String },
    #[error("unknown overflow policy `{0}`, expected `checked` or `wrapping`")]
    UnknownOverflowPolicy(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub max_stack_size: usize,
    pub overflow: OverflowPolicy,
}

impl Default for Config {
    fn default() -> Self {
        let options = VMOptions::default();
        Config { max_stack_size: options.max_stack_size, overflow: options.overflow }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let default = Config::default();
        Ok(Config {
            max_stack_size: parse_env(&lookup, MAX_STACK_SIZE_VAR, default.max_stack_size)?,
            overflow: parse_env(&lookup, OVERFLOW_VAR, default.overflow)?,
        })
    }

    pub fn vm_options(&self) -> VMOptions {
        VMOptions::new(self.max_stack_size, self.overflow)
    }
}

fn parse_env_opt<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr, <T as FromStr>::Err: fmt::Display
{
    let Some(value) = lookup(key) else {
        return Ok(None);
    };
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value.parse::<T>().map(Some).map_err(|err| ConfigError::InvalidEnv {
        key: key.to_string(),
        value: value.to_string(),
        message: err.to_string(),
    })
}

fn parse_env<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr, <T as FromStr>::Err: fmt::Display
{
    Ok(parse_env_opt(lookup, key)?.unwrap_or(default))
}

impl FromStr for OverflowPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "checked" => Ok(OverflowPolicy::Checked),
            "wrapping" | "wrap" => Ok(OverflowPolicy::Wrapping),
            _ => Err(ConfigError::UnknownOverflowPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowPolicy::Checked => f.write_str("checked"),
            OverflowPolicy::Wrapping => f.write_str("wrapping"),
        }
    }
}
