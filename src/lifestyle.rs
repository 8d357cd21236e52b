//! Lifestyle definitions.

use std::fmt;
use std::str::FromStr;

use crate::error::ServantError;

/// Reuse policy of a registered type.
///
/// # Examples
///
/// ```rust
/// use servant::Lifestyle;
///
/// assert_eq!("singleton".parse::<Lifestyle>().unwrap(), Lifestyle::Singleton);
/// assert_eq!(Lifestyle::Transient.to_string(), "Transient");
/// assert!("Scoped".parse::<Lifestyle>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    any(feature = "config", feature = "graph-export"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum Lifestyle {
    /// Only a single instance is created, memoized by the container.
    ///
    /// Concurrent first requests share one construction; the instance is
    /// disposed with the container when it has a disposal capability.
    Singleton,
    /// A new instance is created for every resolution.
    ///
    /// Transient instances are never tracked for disposal.
    Transient,
}

impl Lifestyle {
    /// All lifestyles, in declaration order.
    pub const ALL: [Lifestyle; 2] = [Lifestyle::Singleton, Lifestyle::Transient];

    pub fn as_str(&self) -> &'static str {
        match self {
            Lifestyle::Singleton => "Singleton",
            Lifestyle::Transient => "Transient",
        }
    }
}

impl fmt::Display for Lifestyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lifestyle {
    type Err = ServantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Lifestyle::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ServantError::InvalidLifestyle(s.to_string()))
    }
}

impl TryFrom<&str> for Lifestyle {
    type Error = ServantError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}
