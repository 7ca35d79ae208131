//! Scoped host parameter resolution.
//!
//! A parameter is a named override attached to one scope instance (the common
//! scope, an organization, a location, a domain, a subnet, an operating system,
//! a host group or a single host). Resolving a name for a host picks the value
//! attached to the most specific scope that applies to that host.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod codec;
pub mod config;
pub mod index;
pub mod parameter;
pub mod prelude;
pub mod resolver;
pub mod validator;

pub use app::{App, AppBuilder};
pub use hostparam_types::scope::{self, ScopeKind, ScopeRef, priority_of, priority_of_type};
pub use resolver::{HostContext, Resolved, Resolver};

// vim: ts=4
