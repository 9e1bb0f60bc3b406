//! Bootstrap layer: configuration, logging, and connection wiring.
//!
//! Front-ends call this crate to turn environment configuration and an
//! injected chain backend into a connected [`ConnectionManager`], the
//! single process-wide owner of wallet/connection state. Typical startup:
//!
//! ```ignore
//! client_bootstrap::logging::init()?;
//!
//! let config = client_bootstrap::ClientConfig::from_env();
//! let manager = client_bootstrap::ClientBuilder::new(config)
//!     .chain_client(backend)
//!     .build()?;
//! manager.connect().await?;
//!
//! let session = manager.open_session(address).await?;
//! ```

pub mod builder;
pub mod config;
pub mod logging;
pub mod manager;

pub use builder::ClientBuilder;
pub use config::ClientConfig;
pub use manager::ConnectionManager;
