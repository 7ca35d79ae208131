//! Authorization boundary
//!
//! The core asks these questions before it exposes or changes anything. The
//! policy itself lives outside hostparam; two simple implementations are
//! provided for automation and tests.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::prelude::*;
use crate::types::Parameter;

pub const ROLE_VIEWER: &str = "viewer";
pub const ROLE_EDITOR: &str = "editor";
pub const ROLE_ADMIN: &str = "admin";

/// Identity of whoever is calling into the core
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
	pub id: Box<str>,
	pub roles: Box<[Box<str>]>,
}

impl Caller {
	pub fn new(id: impl Into<Box<str>>, roles: &[&str]) -> Self {
		Self { id: id.into(), roles: roles.iter().map(|r| (*r).into()).collect() }
	}

	/// Internal automation (resolution for deployment, cascade removals)
	pub fn system() -> Self {
		Self::new("system", &[ROLE_ADMIN])
	}

	pub fn has_role(&self, role: &str) -> bool {
		self.roles.iter().any(|r| r.as_ref() == role)
	}
}

pub trait Authorizer: Debug + Send + Sync {
	/// May the caller see this parameter (and its decoded value if hidden)?
	fn can_read(&self, caller: &Caller, param: &Parameter) -> bool;

	/// May the caller create, change or remove overrides in this scope?
	fn can_write(&self, caller: &Caller, scope: &ScopeRef) -> bool;
}

/// Grants everything. For trusted in-process automation.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl Authorizer for AllowAll {
	fn can_read(&self, _caller: &Caller, _param: &Parameter) -> bool {
		true
	}

	fn can_write(&self, _caller: &Caller, _scope: &ScopeRef) -> bool {
		true
	}
}

/// Role based policy
///
/// - `viewer`: reads non-hidden parameters
/// - `editor`: reads non-hidden parameters, writes any non-common scope
/// - `admin`: everything, including hidden values and the common scope
#[derive(Debug, Default, Clone, Copy)]
pub struct RoleAuthorizer;

impl Authorizer for RoleAuthorizer {
	fn can_read(&self, caller: &Caller, param: &Parameter) -> bool {
		if caller.has_role(ROLE_ADMIN) {
			return true;
		}
		if param.hidden {
			return false;
		}
		caller.has_role(ROLE_VIEWER) || caller.has_role(ROLE_EDITOR)
	}

	fn can_write(&self, caller: &Caller, scope: &ScopeRef) -> bool {
		match scope {
			ScopeRef::Common => caller.has_role(ROLE_ADMIN),
			_ => caller.has_role(ROLE_ADMIN) || caller.has_role(ROLE_EDITOR),
		}
	}
}


// vim: ts=4
