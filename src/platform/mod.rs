//! Target-specific helpers shared by the catalog loader and the mutation runner.

pub mod runtime;
pub mod token;
