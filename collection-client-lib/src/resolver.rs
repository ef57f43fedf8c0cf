//! Effective configuration resolution.
//!
//! Each knob is resolved with a fixed precedence chain:
//!
//! | knob | 1 | 2 | 3 | 4 |
//! |---|---|---|---|---|
//! | token | explicit | env `PYFUNCEBLE_COLLECTION_API_TOKEN` | `""` | |
//! | url base | explicit | loaded `collection.url_base` | env `PYFUNCEBLE_COLLECTION_API_URL` | `http://localhost:8001` |
//! | preferred status origin | explicit | loaded `collection.preferred_status_origin` | | `frequent` |
//! | timeout | explicit | loaded `lookup.timeout` | | `5.0` |
//!
//! Once an application configuration is loaded, it shadows the environment
//! for the URL base even when it leaves `url_base` unset: the default wins
//! in that case.

use crate::config::{EnvConfig, EnvLookup, FileConfig, ProcessEnv};
use crate::error::CollectionError;
use crate::types::{ClientConfig, StatusOrigin, STD_TIMEOUT, STD_URL_BASE};

/// Values supplied explicitly when constructing a client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientOverrides {
    pub token: Option<String>,
    pub url_base: Option<String>,
    pub preferred_status_origin: Option<String>,
    pub timeout: Option<f64>,
}

impl ClientOverrides {
    pub fn with_token<T: Into<String>>(mut self, token: T) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_url_base<U: Into<String>>(mut self, url_base: U) -> Self {
        self.url_base = Some(url_base.into());
        self
    }

    pub fn with_preferred_status_origin<O: Into<String>>(mut self, origin: O) -> Self {
        self.preferred_status_origin = Some(origin.into());
        self
    }

    pub fn with_timeout(mut self, timeout: f64) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Computes the effective [`ClientConfig`] from explicit input, a loaded
/// application configuration, the environment and hard-coded defaults.
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    loaded: Option<FileConfig>,
    env: EnvConfig,
}

impl ConfigResolver {
    /// Create a resolver over an explicit environment.
    ///
    /// `loaded` is the application configuration, if one was loaded.
    pub fn new(loaded: Option<FileConfig>, env: &dyn EnvLookup) -> Self {
        Self {
            loaded,
            env: EnvConfig::from_lookup(env),
        }
    }

    /// Create a resolver reading the process environment.
    pub fn from_process_env(loaded: Option<FileConfig>) -> Self {
        Self::new(loaded, &ProcessEnv)
    }

    /// Resolve every knob.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the first value that fails
    /// validation, wherever it came from.
    pub fn resolve(&self, overrides: &ClientOverrides) -> Result<ClientConfig, CollectionError> {
        let mut config = ClientConfig::default();

        match &overrides.token {
            Some(token) => config.set_token(token.as_str()),
            None => self.guess_token(&mut config),
        }

        match &overrides.url_base {
            Some(url_base) => config.set_url_base(url_base)?,
            None => self.guess_url_base(&mut config)?,
        }

        match &overrides.preferred_status_origin {
            Some(origin) => config.set_preferred_status_origin(origin)?,
            None => self.guess_preferred_status_origin(&mut config)?,
        }

        match overrides.timeout {
            Some(timeout) => config.set_timeout(timeout)?,
            None => self.guess_timeout(&mut config)?,
        }

        Ok(config)
    }

    /// Token from the environment, or anonymous.
    pub fn guess_token(&self, config: &mut ClientConfig) {
        config.set_token(self.env.token.clone().unwrap_or_default());
    }

    pub fn guess_url_base(&self, config: &mut ClientConfig) -> Result<(), CollectionError> {
        if let Some(loaded) = &self.loaded {
            config.set_url_base(loaded.collection_url_base().unwrap_or(STD_URL_BASE))
        } else if let Some(url_base) = &self.env.url_base {
            config.set_url_base(url_base)
        } else {
            config.set_url_base(STD_URL_BASE)
        }
    }

    pub fn guess_preferred_status_origin(
        &self,
        config: &mut ClientConfig,
    ) -> Result<(), CollectionError> {
        let origin = self
            .loaded
            .as_ref()
            .and_then(FileConfig::collection_preferred_status_origin)
            .unwrap_or(StatusOrigin::default().as_str());

        config.set_preferred_status_origin(origin)
    }

    pub fn guess_timeout(&self, config: &mut ClientConfig) -> Result<(), CollectionError> {
        let timeout = self
            .loaded
            .as_ref()
            .and_then(FileConfig::lookup_timeout)
            .unwrap_or(STD_TIMEOUT);

        config.set_timeout(timeout)
    }

    /// Re-run every guess except the token, which is only ever taken from
    /// explicit input or the environment at construction time.
    pub fn guess_all_settings(&self, config: &mut ClientConfig) -> Result<(), CollectionError> {
        self.guess_url_base(config)?;
        self.guess_preferred_status_origin(config)?;
        self.guess_timeout(config)
    }
}
