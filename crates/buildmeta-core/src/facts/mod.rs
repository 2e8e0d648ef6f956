//! The accumulating bag of build facts and the well-known keys it holds.

pub mod keys;
pub mod store;
