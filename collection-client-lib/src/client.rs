//! Main collection client implementation.
//!
//! This module provides the `CollectionClient` struct that pulls subjects
//! from, and pushes checker statuses to, a collection API.

use crate::api::{
    build_session, detect_api_generation, post_json, pull_endpoint, status_endpoint,
    whois_endpoint,
};
use crate::error::CollectionError;
use crate::resolver::{ClientOverrides, ConfigResolver};
use crate::status::CheckerStatus;
use crate::types::{ApiGeneration, CheckerType, ClientConfig};
use serde_json::{json, Value};
use tokio::sync::Mutex;

/// Client for one collection API deployment.
///
/// Network failures never surface as errors: `pull` and `push` return `None`
/// when the collection cannot be reached or answers with anything but a
/// JSON 200. Errors are reserved for misuse (empty subject, unsupported
/// checker type, invalid configuration).
///
/// # Example
///
/// ```rust,no_run
/// use collection_client_lib::{ClientOverrides, CollectionClient, ConfigResolver};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let resolver = ConfigResolver::from_process_env(None);
///     let overrides = ClientOverrides::default().with_url_base("https://collection.example.org");
///     let client = CollectionClient::from_resolver(&resolver, &overrides)?;
///
///     if let Some(record) = client.pull("example.com").await {
///         println!("{}", record);
///     }
///     Ok(())
/// }
/// ```
pub struct CollectionClient {
    config: ClientConfig,
    session: reqwest::Client,
    /// Detected API generation. Held locked across the probe so concurrent
    /// first calls share a single detection.
    generation: Mutex<ApiGeneration>,
}

impl CollectionClient {
    /// Create a client configured from the process environment and defaults.
    pub fn new() -> Result<Self, CollectionError> {
        Self::from_resolver(
            &ConfigResolver::from_process_env(None),
            &ClientOverrides::default(),
        )
    }

    /// Create a client from explicit overrides, falling back on `resolver`
    /// for everything left unset.
    pub fn from_resolver(
        resolver: &ConfigResolver,
        overrides: &ClientOverrides,
    ) -> Result<Self, CollectionError> {
        Self::with_config(resolver.resolve(overrides)?)
    }

    /// Create a client from an already validated configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self, CollectionError> {
        let session = build_session(config.token())?;

        Ok(Self {
            config,
            session,
            generation: Mutex::new(ApiGeneration::Unknown),
        })
    }

    /// Get the current configuration for this client.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Replace the token and rebuild the session headers.
    ///
    /// The detected API generation is kept; call
    /// [`reset_api_generation`](Self::reset_api_generation) to detect again.
    pub fn set_token<T: Into<String>>(&mut self, token: T) -> Result<&mut Self, CollectionError> {
        let token = token.into();
        self.session = build_session(&token)?;
        self.config.set_token(token);
        Ok(self)
    }

    pub fn set_url_base(&mut self, url_base: &str) -> Result<&mut Self, CollectionError> {
        self.config.set_url_base(url_base)?;
        Ok(self)
    }

    pub fn set_preferred_status_origin(
        &mut self,
        origin: &str,
    ) -> Result<&mut Self, CollectionError> {
        self.config.set_preferred_status_origin(origin)?;
        Ok(self)
    }

    pub fn set_timeout(&mut self, timeout: f64) -> Result<&mut Self, CollectionError> {
        self.config.set_timeout(timeout)?;
        Ok(self)
    }

    /// Re-run every guess of `resolver` (token excepted) and detect the API
    /// generation again.
    pub async fn guess_all_settings(
        &mut self,
        resolver: &ConfigResolver,
    ) -> Result<ApiGeneration, CollectionError> {
        resolver.guess_all_settings(&mut self.config)?;
        self.reset_api_generation().await;
        Ok(self.ensure_api_generation().await)
    }

    /// The cached API generation, `Unknown` until the first network call.
    pub async fn api_generation(&self) -> ApiGeneration {
        *self.generation.lock().await
    }

    /// Detect the API generation if it is still unknown and return it.
    pub async fn ensure_api_generation(&self) -> ApiGeneration {
        let mut generation = self.generation.lock().await;

        if !generation.is_resolved() {
            let detected = detect_api_generation(&self.session, &self.config).await;
            tracing::debug!(generation = %detected, "Detected collection API generation");
            *generation = detected;
        }

        *generation
    }

    /// Force the API generation, bypassing detection.
    pub async fn set_api_generation(&self, value: ApiGeneration) {
        *self.generation.lock().await = value;
    }

    /// Forget the detected API generation; the next network call detects it
    /// again.
    pub async fn reset_api_generation(&self) {
        self.set_api_generation(ApiGeneration::Unknown).await;
    }

    /// Pull everything the collection knows about `subject`.
    ///
    /// Returns `None` when the subject is unknown or the collection cannot be
    /// reached.
    pub async fn pull(&self, subject: &str) -> Option<Value> {
        let generation = self.ensure_api_generation().await;

        tracing::info!(subject, "Starting to search subject");

        let url = pull_endpoint(self.config.url_base(), generation, self.config.has_token());
        let response = self.post(&url, &json!({ "subject": subject })).await;

        match &response {
            Some(data) => tracing::debug!(subject, response = %data, "Successfully searched subject"),
            None => tracing::debug!(subject, url = %url, "Failed to search subject"),
        }
        tracing::info!(subject, "Finished to search subject");

        response
    }

    /// Alias of [`pull`](Self::pull).
    pub async fn get(&self, subject: &str) -> Option<Value> {
        self.pull(subject).await
    }

    /// Whether the collection returned anything for `subject`.
    pub async fn contains(&self, subject: &str) -> bool {
        self.pull(subject).await.is_some()
    }

    /// Push a checker status to the collection.
    ///
    /// On a legacy deployment, an availability status carrying an expiration
    /// date is first submitted as a WHOIS record.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` when the subject is empty, or when a token is
    /// set and the checker type is not one of `syntax`, `reputation`,
    /// `availability`.
    pub async fn push(&self, status: &CheckerStatus) -> Result<Option<Value>, CollectionError> {
        if status.subject().is_empty() {
            return Err(CollectionError::invalid_value(
                "checker_status.subject",
                "cannot be empty",
            ));
        }

        let generation = self.ensure_api_generation().await;

        if generation == ApiGeneration::Legacy && status.expiration_date().is_some() {
            self.push_whois(status).await?;
        }

        let payload = status.to_json()?;
        self.submit_status(generation, &status.checker_type().to_lowercase(), &payload)
            .await
    }

    /// Submit a raw status payload for `checker_type`.
    ///
    /// Without a token this is a no-op returning `Ok(None)`, whatever the
    /// checker type.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` when a token is set and `checker_type` is not
    /// supported.
    pub async fn push_status(
        &self,
        checker_type: &str,
        data: &Value,
    ) -> Result<Option<Value>, CollectionError> {
        if !self.config.has_token() {
            return Ok(None);
        }

        let generation = self.ensure_api_generation().await;
        self.submit_status(generation, checker_type, data).await
    }

    /// Submit the WHOIS side of a status record.
    ///
    /// The endpoint does not depend on the API generation. Without a token
    /// this is a no-op returning `Ok(None)`.
    pub async fn push_whois(
        &self,
        status: &CheckerStatus,
    ) -> Result<Option<Value>, CollectionError> {
        if !self.config.has_token() {
            return Ok(None);
        }

        let data = status.to_json()?;
        let url = whois_endpoint(self.config.url_base());

        tracing::info!(subject = status.subject(), "Starting to submit WHOIS");
        let response = self.post(&url, &data).await;
        match &response {
            Some(_) => tracing::debug!(url = %url, data = %data, "Successfully submitted WHOIS data"),
            None => tracing::debug!(url = %url, data = %data, "Failed to submit WHOIS data"),
        }
        tracing::info!(subject = status.subject(), "Finished to submit WHOIS");

        Ok(response)
    }

    async fn submit_status(
        &self,
        generation: ApiGeneration,
        checker_type: &str,
        data: &Value,
    ) -> Result<Option<Value>, CollectionError> {
        if !self.config.has_token() {
            return Ok(None);
        }

        let checker_type: CheckerType = checker_type.parse()?;
        let url = status_endpoint(
            self.config.url_base(),
            generation,
            self.config.has_token(),
            checker_type,
        );

        tracing::info!(checker_type = %checker_type, "Starting to submit status");
        let response = self.post(&url, data).await;
        match &response {
            Some(_) => tracing::debug!(url = %url, data = %data, "Successfully submitted status"),
            None => tracing::debug!(url = %url, data = %data, "Failed to submit status"),
        }
        tracing::info!(checker_type = %checker_type, "Finished to submit status");

        Ok(response)
    }

    /// POST with the configured timeout, turning every failure into `None`.
    async fn post(&self, url: &str, body: &Value) -> Option<Value> {
        match post_json(&self.session, url, body, self.config.timeout_duration()).await {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::debug!(url, error = %e, "Collection request failed");
                None
            }
        }
    }
}
