//! Parameter name validation

use hostparam_types::param_adapter::ParamAdapter;

use crate::prelude::*;

/// Longest accepted name, matching the storage column width
pub const MAX_NAME_LENGTH: usize = 255;

/// A name must be non-empty, free of whitespace and fit the storage column.
///
/// Names are compared exactly; nothing is trimmed or case-folded here.
pub fn validate_name(name: &str) -> ClResult<()> {
	if name.is_empty() {
		return Err(Error::EmptyName);
	}
	if name.chars().any(char::is_whitespace) {
		return Err(Error::Whitespace(name.into()));
	}
	if name.len() > MAX_NAME_LENGTH {
		return Err(Error::ValidationError(format!(
			"parameter name is too long ({} > {} bytes)",
			name.len(),
			MAX_NAME_LENGTH
		)));
	}
	Ok(())
}

/// Fails if a parameter other than `excluding` already holds `name` in `scope`
pub async fn validate_uniqueness(
	adapter: &dyn ParamAdapter,
	name: &str,
	scope: &ScopeRef,
	excluding: Option<ParamId>,
) -> ClResult<()> {
	match adapter.find_by_scope(scope, name).await? {
		Some(existing) if Some(existing.param_id) != excluding => {
			Err(Error::DuplicateName { name: name.into(), scope: *scope })
		}
		_ => Ok(()),
	}
}


// vim: ts=4
