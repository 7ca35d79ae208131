//! Scope registry
//!
//! The eight scope kinds a parameter can be attached to, their fixed priority
//! ranks and the names they are stored under. Higher priority means more
//! specific and wins during resolution.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
	Common,
	Organization,
	Location,
	Domain,
	Subnet,
	OperatingSystem,
	HostGroup,
	Host,
}

/// (kind, priority, stored type name, snake_case alias)
static REGISTRY: [(ScopeKind, i32, &str, &str); 8] = [
	(ScopeKind::Common, 0, "CommonParameter", "common_parameter"),
	(ScopeKind::Organization, 10, "OrganizationParameter", "organization_parameter"),
	(ScopeKind::Location, 20, "LocationParameter", "location_parameter"),
	(ScopeKind::Domain, 30, "DomainParameter", "domain_parameter"),
	(ScopeKind::Subnet, 40, "SubnetParameter", "subnet_parameter"),
	(ScopeKind::OperatingSystem, 50, "OsParameter", "os_parameter"),
	(ScopeKind::HostGroup, 60, "GroupParameter", "group_parameter"),
	(ScopeKind::Host, 70, "HostParameter", "host_parameter"),
];

impl ScopeKind {
	/// All kinds, least specific first
	pub const ALL: [ScopeKind; 8] = [
		ScopeKind::Common,
		ScopeKind::Organization,
		ScopeKind::Location,
		ScopeKind::Domain,
		ScopeKind::Subnet,
		ScopeKind::OperatingSystem,
		ScopeKind::HostGroup,
		ScopeKind::Host,
	];

	fn entry(self) -> &'static (ScopeKind, i32, &'static str, &'static str) {
		// REGISTRY is laid out in declaration order
		&REGISTRY[self as usize]
	}

	pub fn priority(self) -> i32 {
		self.entry().1
	}

	/// Name the kind is persisted under
	pub fn type_name(self) -> &'static str {
		self.entry().2
	}

	/// snake_case form of the type name, used in URLs
	pub fn snake_name(self) -> &'static str {
		self.entry().3
	}
}

impl std::fmt::Display for ScopeKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.type_name())
	}
}

impl FromStr for ScopeKind {
	type Err = Error;

	fn from_str(s: &str) -> ClResult<Self> {
		REGISTRY
			.iter()
			.find(|(_, _, type_name, alias)| *type_name == s || *alias == s)
			.map(|(kind, _, _, _)| *kind)
			.ok_or_else(|| Error::UnknownScopeKind(s.into()))
	}
}

/// Priority of a scope kind. Total over the eight kinds.
pub fn priority_of(kind: ScopeKind) -> i32 {
	kind.priority()
}

/// Priority of a stored type name (`OsParameter` or `os_parameter`)
pub fn priority_of_type(type_name: &str) -> ClResult<i32> {
	type_name.parse::<ScopeKind>().map(priority_of)
}

/// A concrete scope instance: the kind tag plus the id of the owning entity.
///
/// `Common` is a singleton and carries no reference id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ScopeRef {
	Common,
	Organization(RefId),
	Location(RefId),
	Domain(RefId),
	Subnet(RefId),
	OperatingSystem(RefId),
	HostGroup(RefId),
	Host(RefId),
}

impl ScopeRef {
	/// Build a scope from its persisted parts.
	///
	/// The reference id must be absent for `Common` and present for every other kind.
	pub fn from_parts(kind: ScopeKind, reference_id: Option<RefId>) -> ClResult<Self> {
		match (kind, reference_id) {
			(ScopeKind::Common, None) => Ok(ScopeRef::Common),
			(ScopeKind::Common, Some(_)) => Err(Error::ValidationError(
				"common scope does not take a reference id".into(),
			)),
			(kind, None) => {
				Err(Error::ValidationError(format!("{} requires a reference id", kind)))
			}
			(ScopeKind::Organization, Some(id)) => Ok(ScopeRef::Organization(id)),
			(ScopeKind::Location, Some(id)) => Ok(ScopeRef::Location(id)),
			(ScopeKind::Domain, Some(id)) => Ok(ScopeRef::Domain(id)),
			(ScopeKind::Subnet, Some(id)) => Ok(ScopeRef::Subnet(id)),
			(ScopeKind::OperatingSystem, Some(id)) => Ok(ScopeRef::OperatingSystem(id)),
			(ScopeKind::HostGroup, Some(id)) => Ok(ScopeRef::HostGroup(id)),
			(ScopeKind::Host, Some(id)) => Ok(ScopeRef::Host(id)),
		}
	}

	pub fn kind(&self) -> ScopeKind {
		match self {
			ScopeRef::Common => ScopeKind::Common,
			ScopeRef::Organization(_) => ScopeKind::Organization,
			ScopeRef::Location(_) => ScopeKind::Location,
			ScopeRef::Domain(_) => ScopeKind::Domain,
			ScopeRef::Subnet(_) => ScopeKind::Subnet,
			ScopeRef::OperatingSystem(_) => ScopeKind::OperatingSystem,
			ScopeRef::HostGroup(_) => ScopeKind::HostGroup,
			ScopeRef::Host(_) => ScopeKind::Host,
		}
	}

	pub fn reference_id(&self) -> Option<RefId> {
		match *self {
			ScopeRef::Common => None,
			ScopeRef::Organization(id)
			| ScopeRef::Location(id)
			| ScopeRef::Domain(id)
			| ScopeRef::Subnet(id)
			| ScopeRef::OperatingSystem(id)
			| ScopeRef::HostGroup(id)
			| ScopeRef::Host(id) => Some(id),
		}
	}
}

impl std::fmt::Display for ScopeRef {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self.reference_id() {
			Some(id) => write!(f, "{}#{}", self.kind(), id),
			None => write!(f, "{}", self.kind()),
		}
	}
}


// vim: ts=4
