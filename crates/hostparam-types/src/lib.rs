//! Shared types, adapter traits, and core utilities for hostparam.
//!
//! This crate holds everything that both the resolution core and the storage
//! adapters need to agree on: the scope registry, the parameter entity, the
//! storage and authorization boundaries, and the common error type.

#![forbid(unsafe_code)]

pub mod auth_adapter;
pub mod error;
pub mod param_adapter;
pub mod prelude;
pub mod scope;
pub mod types;

// vim: ts=4
