//! Shared utilities: signatures for incremental builds and test helpers.

pub mod hash;

#[cfg(test)]
pub mod testutil;
