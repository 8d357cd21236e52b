//! Error types for the servant container.

use std::any::Any;
use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

/// Boxed error returned by user factories.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Container errors
///
/// Covers the three failure families of the container: configuration errors
/// raised by [`Servant::add`](crate::Servant::add), resolution errors raised
/// while serving an instance, and the usage error raised by any operation
/// attempted after disposal. Failures produced by user factories travel in
/// [`ServantError::Factory`] untouched.
///
/// The error is `Clone` so that one failed singleton construction can be
/// reported to every caller that was awaiting it.
///
/// # Examples
///
/// ```rust
/// use servant::{Servant, ServantError};
///
/// struct Missing;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let servant = Servant::new();
/// match servant.serve::<Missing>().await {
///     Err(ServantError::NotRegistered(name)) => assert!(name.ends_with("Missing")),
///     _ => unreachable!(),
/// }
/// # }
/// ```
#[derive(Debug, Clone, Error)]
pub enum ServantError {
    /// A type listed itself among its own dependencies.
    #[error("Type \"{0}\" depends upon its own type, which is disallowed.")]
    SelfDependency(&'static str),

    /// The same dependency type appears twice in one parameter list.
    #[error("Type \"{declared}\" has multiple dependencies upon type \"{dependency}\", which is disallowed.")]
    DuplicateDependency {
        declared: &'static str,
        dependency: &'static str,
    },

    /// Registering the edge `declared -> dependency` would close a cycle.
    #[error("Type \"{declared}\" cannot depend upon type \"{dependency}\" as this would create circular dependencies.")]
    Cycle {
        declared: &'static str,
        dependency: &'static str,
    },

    /// The declared type already has a provider.
    #[error("Type \"{0}\" already registered.")]
    AlreadyRegistered(&'static str),

    /// A lifestyle name that is neither `Singleton` nor `Transient`.
    #[error("Invalid lifestyle \"{0}\".")]
    InvalidLifestyle(String),

    /// The requested type has no provider.
    #[error("Type \"{0}\" is not registered.")]
    NotRegistered(&'static str),

    /// A provider depends on a type that has no provider.
    ///
    /// `suggestions` lists every registered super-type of the missing type.
    #[error("Type \"{declared}\" depends upon unregistered type \"{dependency}\".{}", suggestion_text(.suggestions))]
    UnregisteredDependency {
        declared: &'static str,
        dependency: &'static str,
        suggestions: Vec<&'static str>,
    },

    /// The factory produced no instance.
    #[error("Instance for type \"{0}\" cannot be null.")]
    NullInstance(&'static str),

    /// The factory produced a value that is not an instance of the declared type.
    #[error("Instance produced for type \"{declared}\" is not an instance of that type.")]
    NotAssignable {
        declared: &'static str,
        produced: &'static str,
    },

    /// A typed factory was handed an argument of the wrong type or arity.
    #[error("Factory argument {index} was expected to be of type \"{expected}\".")]
    ArgumentMismatch { index: usize, expected: &'static str },

    /// The dependency graph references types without a provider.
    #[error("Dependency graph is incomplete; no provider registered for {}.", quoted(.0))]
    IncompleteGraph(Vec<&'static str>),

    /// The container has been disposed.
    #[error("Cannot access a disposed object. Object name: '{container}'.")]
    Disposed { container: String },

    /// Options could not be loaded.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Failure raised by a user factory, propagated unmodified.
    #[error(transparent)]
    Factory(Arc<dyn StdError + Send + Sync>),
}

impl ServantError {
    /// Wraps a user factory failure. Container errors carried in the box are
    /// unwrapped rather than nested.
    pub fn factory(error: BoxError) -> Self {
        match error.downcast::<ServantError>() {
            Ok(servant) => *servant,
            Err(other) => ServantError::Factory(Arc::from(other)),
        }
    }

    /// Returns `true` for errors raised at registration time.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ServantError::SelfDependency(_)
                | ServantError::DuplicateDependency { .. }
                | ServantError::Cycle { .. }
                | ServantError::AlreadyRegistered(_)
                | ServantError::InvalidLifestyle(_)
                | ServantError::Config(_)
        )
    }

    /// Returns the user factory error, if this is one.
    pub fn factory_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            ServantError::Factory(inner) => Some(inner.as_ref()),
            _ => None,
        }
    }
}

/// A factory panicked while producing its instance.
///
/// Reported inside [`ServantError::Factory`]; the provider stays usable and the
/// next request runs the factory again.
#[derive(Debug, Clone, Error)]
#[error("factory panicked: {message}")]
pub struct FactoryPanic {
    pub message: String,
}

impl FactoryPanic {
    pub(crate) fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(message) => *message,
            Err(payload) => match payload.downcast_ref::<&'static str>() {
                Some(message) => (*message).to_string(),
                None => "non-string panic payload".to_string(),
            },
        };
        FactoryPanic { message }
    }
}

fn suggestion_text(suggestions: &[&'static str]) -> String {
    if suggestions.is_empty() {
        return String::new();
    }
    let options: Vec<String> = suggestions.iter().map(|s| format!("\"{}\"", s)).collect();
    format!(
        " Did you mean to reference registered super type {}?",
        options.join(" or ")
    )
}

fn quoted(names: &[&'static str]) -> String {
    names
        .iter()
        .map(|n| format!("\"{}\"", n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for container operations
pub type ServantResult<T> = Result<T, ServantError>;
