//! Capability traits implemented by produced services.

pub mod dispose;

pub use dispose::{AsyncDispose, Dispose};
