#![doc = include_str!("../README.md")]

pub mod error_catalog;
pub mod mutation;
pub mod notification;
pub mod platform;

#[cfg(all(test, not(target_arch = "wasm32")))]
pub mod test_support;
