//! Global defaults for sample sizes and seeding.

use thiserror::Error;

use crate::rng::{DefaultRngProvider, RngProvider};

/// Sample size used when a quantifier does not request one
pub const DEFAULT_SAMPLE_SIZE: usize = 100;

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Sample sizes must be positive
    #[error("Invalid sample size: {0} (must be > 0)")]
    InvalidSampleSize(usize),
}

/// Process-wide defaults the metadata layer falls back on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalConfig {
    /// Sample size for quantifiers that do not set one
    pub default_sample_size: usize,
    /// Seed for reproducible runs; fresh entropy when `None`
    pub seed: Option<u64>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            default_sample_size: DEFAULT_SAMPLE_SIZE,
            seed: None,
        }
    }
}

impl GlobalConfig {
    /// Create a new global configuration with validation
    pub fn new(default_sample_size: usize, seed: Option<u64>) -> Result<Self, ConfigError> {
        let config = Self {
            default_sample_size,
            seed,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_sample_size == 0 {
            return Err(ConfigError::InvalidSampleSize(self.default_sample_size));
        }
        Ok(())
    }

    /// A randomness source honoring the configured seed
    pub fn create_source(&self) -> <DefaultRngProvider as RngProvider>::Source {
        DefaultRngProvider.create_source(self.seed)
    }
}

/// Holder for the current global configuration
#[derive(Debug, Default)]
pub struct ConfigManager {
    global_config: GlobalConfig,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager around a custom configuration
    pub fn with_global_config(global_config: GlobalConfig) -> Result<Self, ConfigError> {
        global_config.validate()?;
        Ok(Self { global_config })
    }

    pub fn global_config(&self) -> &GlobalConfig {
        &self.global_config
    }

    /// Replace the configuration; invalid configurations are rejected
    pub fn set_global_config(&mut self, global_config: GlobalConfig) -> Result<(), ConfigError> {
        global_config.validate()?;
        self.global_config = global_config;
        Ok(())
    }
}

// Thread-local global configuration manager (doc comment not allowed on thread_local!)
thread_local! {
    static CONFIG_MANAGER: std::cell::RefCell<ConfigManager> = std::cell::RefCell::new(ConfigManager::new());
}

/// Get the current global configuration
pub fn get_global_config() -> GlobalConfig {
    CONFIG_MANAGER.with(|manager| manager.borrow().global_config().clone())
}

/// Set the global configuration
pub fn set_global_config(config: GlobalConfig) -> Result<(), ConfigError> {
    CONFIG_MANAGER.with(|manager| manager.borrow_mut().set_global_config(config))
}
