//! Export towards search indexing and URL identifiers
//!
//! Indexers receive one flat entry per parameter. Hidden values are always
//! replaced by the redaction placeholder; neither the plain text nor the
//! encoded form ever leaves through this path.

use serde::Serialize;
use serde_with::skip_serializing_none;

use hostparam_types::types::Parameter;

use crate::parameter::REDACTED;
use crate::prelude::*;

/// Search field naming the owning scope instance
pub fn scope_search_field(kind: ScopeKind) -> Option<&'static str> {
	match kind {
		ScopeKind::Common => None,
		ScopeKind::Organization => Some("organization_name"),
		ScopeKind::Location => Some("location_name"),
		ScopeKind::Domain => Some("domain_name"),
		ScopeKind::Subnet => Some("subnet_name"),
		ScopeKind::OperatingSystem => Some("os_name"),
		ScopeKind::HostGroup => Some("host_group_name"),
		ScopeKind::Host => Some("host_name"),
	}
}

#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
	pub param_id: ParamId,
	pub name: Box<str>,
	pub value: Box<str>,
	pub scope_kind: ScopeKind,
	pub reference_id: Option<RefId>,
	/// Display name of the owning scope instance, if the caller could supply one
	pub scope_name: Option<Box<str>>,
	pub slug: Box<str>,
}

impl IndexEntry {
	/// Build an entry from a stored parameter
	pub fn from_parameter(param: &Parameter, scope_name: Option<Box<str>>) -> Self {
		Self {
			param_id: param.param_id,
			name: param.name.clone(),
			value: if param.hidden { REDACTED.into() } else { param.value.clone() },
			scope_kind: param.scope_kind(),
			reference_id: param.reference_id(),
			scope_name,
			slug: slug::scoped_slug(param),
		}
	}

	/// `(field, value)` pairs for attribute search
	pub fn search_fields(&self) -> Vec<(&'static str, &str)> {
		let mut fields = vec![
			("name", self.name.as_ref()),
			("type", self.scope_kind.type_name()),
			("value", self.value.as_ref()),
		];
		if let (Some(field), Some(scope_name)) =
			(scope_search_field(self.scope_kind), self.scope_name.as_deref())
		{
			fields.push((field, scope_name));
		}
		fields
	}
}

/// Index entries for a set of stored parameters
pub fn index_entries<F>(params: &[Parameter], scope_name: F) -> Vec<IndexEntry>
where
	F: Fn(&ScopeRef) -> Option<Box<str>>,
{
	params.iter().map(|param| IndexEntry::from_parameter(param, scope_name(&param.scope))).collect()
}

pub mod slug {
	use hostparam_types::types::Parameter;

	/// Lowercase, keeping ASCII alphanumerics, `_` and `-`; runs of anything else
	/// become a single `-`
	pub fn slugify(name: &str) -> String {
		let mut res = String::with_capacity(name.len());
		for c in name.chars() {
			if c.is_ascii_alphanumeric() || c == '_' {
				res.push(c.to_ascii_lowercase());
			} else if !res.ends_with('-') {
				res.push('-');
			}
		}
		res.trim_matches('-').to_string()
	}

	/// URL parameter form `<id>-<slug>`, resolvable with `read_by_param`
	pub fn to_param(param: &Parameter) -> String {
		let slug = slugify(&param.name);
		if slug.is_empty() { param.param_id.to_string() } else { format!("{}-{}", param.param_id, slug) }
	}

	/// Identifier unique across scopes: names only are unique within one scope
	pub fn scoped_slug(param: &Parameter) -> Box<str> {
		let kind = param.scope_kind().snake_name();
		match param.reference_id() {
			Some(id) => format!("{}-{}-{}", kind, id, slugify(&param.name)).into(),
			None => format!("{}-{}", kind, slugify(&param.name)).into(),
		}
	}
}


// vim: ts=4
