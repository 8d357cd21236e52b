//! Internal implementation details.

pub(crate) mod circular;
pub(crate) mod dispose_bag;

pub(crate) use circular::reaches;
pub(crate) use dispose_bag::{DisposalRecord, DisposeBag};
