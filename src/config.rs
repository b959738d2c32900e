//! Runtime configuration.
//!
//! Settings are plain values on [`FftConfig`]. The process-wide defaults are
//! read once from the environment:
//!
//! | variable | field | default |
//! |----------|-------|---------|
//! | `SCIFFTPACK_ENABLE_ND_PLANNING` | `enable_nd_planning` | `true` |
//! | `SCIFFTPACK_PLAN_CACHE_SIZE` | `plan_cache_size` | `16` |
//! | `SCIFFTPACK_MAX_ELEMENTS` | `max_elements` | `1 << 28` |

use std::sync::OnceLock;

use crate::error::FftError;

pub const ENABLE_ND_PLANNING_ENV: &str = "SCIFFTPACK_ENABLE_ND_PLANNING";
pub const PLAN_CACHE_SIZE_ENV: &str = "SCIFFTPACK_PLAN_CACHE_SIZE";
pub const MAX_ELEMENTS_ENV: &str = "SCIFFTPACK_MAX_ELEMENTS";

static GLOBAL: OnceLock<FftConfig> = OnceLock::new();

/// Knobs shared by the facade and the host engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FftConfig {
    /// Let `fftn`-style calls build one N-dimensional plan when no plan is
    /// supplied.
    pub enable_nd_planning: bool,
    /// Plans kept by the host engine. `0` disables caching.
    pub plan_cache_size: usize,
    /// Largest element count a plan or execution may cover.
    pub max_elements: usize,
}

impl Default for FftConfig {
    fn default() -> Self {
        Self {
            enable_nd_planning: true,
            plan_cache_size: 16,
            max_elements: 1 << 28,
        }
    }
}

impl FftConfig {
    pub fn with_nd_planning(mut self, enabled: bool) -> Self {
        self.enable_nd_planning = enabled;
        self
    }

    pub fn with_plan_cache_size(mut self, entries: usize) -> Self {
        self.plan_cache_size = entries;
        self
    }

    pub fn with_max_elements(mut self, elements: usize) -> Self {
        self.max_elements = elements;
        self
    }

    /// Defaults overridden by the `SCIFFTPACK_*` environment variables.
    pub fn from_env() -> Result<Self, FftError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Self::from_env`] but reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, FftError> {
        let mut config = Self::default();
        if let Some(value) = lookup(ENABLE_ND_PLANNING_ENV) {
            config.enable_nd_planning = parse_flag(ENABLE_ND_PLANNING_ENV, &value)?;
        }
        if let Some(value) = lookup(PLAN_CACHE_SIZE_ENV) {
            config.plan_cache_size = parse_count(PLAN_CACHE_SIZE_ENV, &value)?;
        }
        if let Some(value) = lookup(MAX_ELEMENTS_ENV) {
            config.max_elements = parse_count(MAX_ELEMENTS_ENV, &value)?;
        }
        Ok(config)
    }

    /// Process-wide configuration, read from the environment on first use.
    /// Invalid variables are logged and the defaults are used instead.
    pub fn global() -> &'static FftConfig {
        GLOBAL.get_or_init(|| {
            Self::from_env().unwrap_or_else(|err| {
                log::warn!("{err}; using default configuration");
                Self::default()
            })
        })
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, FftError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(FftError::InvalidConfig {
            key,
            value: value.to_string(),
        }),
    }
}

fn parse_count(key: &'static str, value: &str) -> Result<usize, FftError> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| FftError::InvalidConfig {
            key,
            value: value.to_string(),
        })
}
