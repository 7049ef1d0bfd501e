//! Engine configuration
//!
//! Everything has a sensible default; each field can be overridden from the
//! environment so the same build runs against any engine binary.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_ENGINE_PATH: &str = "stockfish";
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_DEPTH: u32 = 12;
pub const DEFAULT_MAX_DEPTH: u32 = 40;

/// How to launch and drive the external engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Engine executable (looked up in PATH when not absolute)
    pub path: PathBuf,
    /// Extra arguments; empty means the engine is started bare
    pub args: Vec<String>,
    /// Hard limit on one search, startup included
    pub timeout: Duration,
    /// Depth used when the request does not name one
    pub default_depth: u32,
    /// Largest depth a request may ask for
    pub max_depth: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_ENGINE_PATH),
            args: Vec::new(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            default_depth: DEFAULT_DEPTH,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl EngineConfig {
    /// Builds a config from `ENGINE_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("ENGINE_PATH").filter(|p| !p.trim().is_empty()) {
            config.path = PathBuf::from(path.trim());
        }
        if let Some(args) = lookup("ENGINE_ARGS") {
            config.args = args.split_whitespace().map(str::to_string).collect();
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "ENGINE_TIMEOUT_MS")? {
            config.timeout = Duration::from_millis(ms);
        }
        if let Some(depth) = parse_var(&lookup, "ENGINE_DEFAULT_DEPTH")? {
            config.default_depth = depth;
        }
        if let Some(depth) = parse_var(&lookup, "ENGINE_MAX_DEPTH")? {
            config.max_depth = depth;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(Error::Config("ENGINE_TIMEOUT_MS must be positive".into()));
        }
        if self.max_depth == 0 {
            return Err(Error::Config("ENGINE_MAX_DEPTH must be positive".into()));
        }
        if self.default_depth == 0 || self.default_depth > self.max_depth {
            return Err(Error::Config(format!(
                "ENGINE_DEFAULT_DEPTH must be between 1 and {}",
                self.max_depth
            )));
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::Config(format!("{}={:?}: {}", key, raw, e))),
        None => Ok(None),
    }
}
