//! # Collection Client Library
//!
//! Client for the collection API that stores availability, syntax and
//! reputation results for domains, IPs and URLs.
//!
//! The client resolves its configuration from explicit values, a loaded
//! application configuration, the environment and defaults; detects whether
//! the remote service speaks the legacy or the modern API; and routes pulls
//! and pushes accordingly. The collection is a best-effort side channel:
//! when it is down, calls return `None` instead of failing.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use collection_client_lib::{CheckerStatus, CollectionClient, StatusBase, SyntaxStatus};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CollectionClient::new()?;
//!
//!     let known = client.pull("example.com").await;
//!     println!("Known to the collection: {}", known.is_some());
//!
//!     let status: CheckerStatus = SyntaxStatus {
//!         base: StatusBase::new("example.com", "SYNTAX"),
//!         ..Default::default()
//!     }
//!     .into();
//!     client.push(&status).await?;
//!     Ok(())
//! }
//! ```

pub use api::{PROBE_PATH, VERSION_HEADER};
pub use client::CollectionClient;
pub use config::{
    CollectionSection, ConfigManager, EnvConfig, EnvLookup, FileConfig, LookupSection,
    ProcessEnv, ENV_API_TOKEN, ENV_API_URL,
};
pub use error::CollectionError;
pub use resolver::{ClientOverrides, ConfigResolver};
pub use status::{
    AvailabilityStatus, CheckerStatus, ReputationStatus, StatusBase, SyntaxFlags, SyntaxStatus,
};
pub use types::{
    parse_timeout, ApiGeneration, CheckerType, ClientConfig, StatusOrigin, STD_TIMEOUT,
    STD_URL_BASE,
};

mod api;
mod client;
mod config;
mod error;
mod resolver;
mod status;
mod types;

pub type Result<T> = std::result::Result<T, CollectionError>;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
