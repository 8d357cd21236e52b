//! # servant
//!
//! Async dependency injection: register construction recipes keyed by type,
//! then await fully-resolved instances.
//!
//! ## Features
//!
//! - **Two lifestyles**: Singleton (created once, memoized) and Transient
//!   (created on every request)
//! - **Async factories**: dependencies of a service are resolved concurrently
//! - **Single-flight singletons**: concurrent first requests share one construction
//! - **Registration-time validation**: self-dependencies, duplicate
//!   dependencies, cycles and re-registration are rejected as they happen
//! - **Ordered disposal**: disposable singletons are torn down in reverse
//!   construction order
//! - **Trait objects**: a service can be declared as `dyn Trait`
//!
//! ## Quick Start
//!
//! ```rust
//! use servant::Servant;
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), servant::ServantError> {
//! let servant = Servant::new();
//! servant.add_singleton(|| Arc::new(Database {
//!     connection_string: "postgres://localhost".to_string(),
//! }))?;
//! servant.add_transient(|db: Arc<Database>| Arc::new(UserService { db }))?;
//!
//! let users = servant.serve::<UserService>().await?;
//! assert_eq!(users.db.connection_string, "postgres://localhost");
//!
//! servant.dispose().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Trait Objects
//!
//! ```rust
//! use servant::Servant;
//! use std::sync::Arc;
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, message: &str) -> String;
//! }
//!
//! struct ConsoleLogger;
//! impl Logger for ConsoleLogger {
//!     fn log(&self, message: &str) -> String {
//!         format!("[LOG] {}", message)
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), servant::ServantError> {
//! let servant = Servant::new();
//! servant.add_singleton_instance::<dyn Logger>(Arc::new(ConsoleLogger))?;
//!
//! let logger = servant.serve::<dyn Logger>().await?;
//! assert_eq!(logger.log("hello"), "[LOG] hello");
//! # Ok(())
//! # }
//! ```
//!
//! ## Lifestyles
//!
//! - **Singleton**: created on first request (or by
//!   [`Servant::create_singletons`]) and shared afterwards
//! - **Transient**: created fresh on every resolution, never disposed by the
//!   container

pub mod config;
pub mod error;
pub mod factory;
pub mod graph_export;
pub mod instance;
pub mod key;
pub mod lifestyle;
pub mod observer;
pub mod traits;

mod container;
mod hierarchy;
mod internal;
mod provider;
mod registration;

pub use config::ServantOptions;
pub use container::Servant;
pub use error::{BoxError, FactoryPanic, ServantError, ServantResult};
pub use factory::{
    AsyncDisposable, AsyncFactory, Construct, Dependencies, Disposable, Factory, FactoryOutput,
};
pub use graph_export::{DependencyGraph, GraphEdge, GraphNode};
pub use instance::Instance;
pub use key::{key_of, TypeKey};
pub use lifestyle::Lifestyle;
pub use observer::{ServantObserver, TracingObserver};
pub use provider::FactoryFuture;
pub use traits::{AsyncDispose, Dispose};
