//! Parameter service: create, read, update, delete and list overrides
//!
//! Composes the storage adapter, the authorizer and the hidden value codec.
//! Parameters handed out by the service carry decoded values; hidden values a
//! caller may not read are replaced by [`REDACTED`] in listings.

use serde::Deserialize;
use std::sync::Arc;

use hostparam_types::auth_adapter::{Authorizer, Caller};
use hostparam_types::param_adapter::{
	ListParameterOptions, NewParameter, ParamAdapter, UpdateParameterData,
};
use hostparam_types::types::Parameter;

use crate::codec::HiddenValueCodec;
use crate::index::{IndexEntry, index_entries};
use crate::prelude::*;
use crate::resolver::{HostContext, Resolved, Resolver};
use crate::scope::priority_of;
use crate::validator;

/// Placeholder shown instead of a hidden value
pub const REDACTED: &str = "*****";

#[derive(Clone, Debug, Deserialize)]
pub struct CreateParameter {
	pub name: Box<str>,
	pub value: Box<str>,
	pub scope: ScopeRef,
	#[serde(default)]
	pub hidden: bool,
}

/// Partial update. Only `value` and `hidden` may change; defining `scope` or
/// `priority` is rejected.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateParameter {
	#[serde(default)]
	pub value: Patch<Box<str>>,
	#[serde(default)]
	pub hidden: Patch<bool>,
	#[serde(default)]
	pub scope: Patch<ScopeRef>,
	#[serde(default)]
	pub priority: Patch<i32>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeleteMode {
	/// Deleting a missing parameter succeeds
	#[default]
	Lenient,
	/// Deleting a missing parameter fails with `Error::NotFound`
	Strict,
}

#[derive(Clone, Debug)]
pub struct ParameterService {
	adapter: Arc<dyn ParamAdapter>,
	codec: Arc<dyn HiddenValueCodec>,
	authorizer: Arc<dyn Authorizer>,
	resolver: Resolver,
}

impl ParameterService {
	pub fn new(
		adapter: Arc<dyn ParamAdapter>,
		codec: Arc<dyn HiddenValueCodec>,
		authorizer: Arc<dyn Authorizer>,
	) -> Self {
		let resolver = Resolver::new(Arc::clone(&adapter));
		Self { adapter, codec, authorizer, resolver }
	}

	fn check_write(&self, caller: &Caller, scope: &ScopeRef) -> ClResult<()> {
		if self.authorizer.can_write(caller, scope) {
			Ok(())
		} else {
			warn!("Write denied for '{}' on {}", caller.id, scope);
			Err(Error::PermissionDenied)
		}
	}

	fn check_read(&self, caller: &Caller, param: &Parameter) -> ClResult<()> {
		if self.authorizer.can_read(caller, param) {
			Ok(())
		} else {
			warn!("Read denied for '{}' on parameter {}", caller.id, param.param_id);
			Err(Error::PermissionDenied)
		}
	}

	/// Copy of a stored parameter with its value decoded
	fn decoded(&self, mut param: Parameter) -> ClResult<Parameter> {
		if param.hidden {
			param.value = self.codec.decode(&param.value)?;
		}
		Ok(param)
	}

	fn stored_value(&self, value: &str, hidden: bool) -> ClResult<Box<str>> {
		if hidden { self.codec.encode(value) } else { Ok(value.into()) }
	}

	/// Attach a new override to a scope
	pub async fn create(&self, caller: &Caller, data: CreateParameter) -> ClResult<Parameter> {
		self.check_write(caller, &data.scope)?;
		validator::validate_name(&data.name)?;
		validator::validate_uniqueness(self.adapter.as_ref(), &data.name, &data.scope, None)
			.await?;

		let priority = priority_of(data.scope.kind());
		let value = self.stored_value(&data.value, data.hidden)?;
		let param = self
			.adapter
			.insert_parameter(&NewParameter {
				name: &data.name,
				value: &value,
				scope: data.scope,
				priority,
				hidden: data.hidden,
			})
			.await?;

		info!("Parameter '{}' created on {} (id={})", param.name, param.scope, param.param_id);
		self.decoded(param)
	}

	/// Read a parameter with its value decoded
	pub async fn read(&self, caller: &Caller, param_id: ParamId) -> ClResult<Parameter> {
		let param = self.adapter.read_parameter(param_id).await?;
		self.check_read(caller, &param)?;
		self.decoded(param)
	}

	/// Read by URL parameter form `<id>-<name>` (or just `<id>`).
	///
	/// Only the leading id is looked up; the name part is decoration and may be
	/// stale after a rename.
	pub async fn read_by_param(&self, caller: &Caller, param: &str) -> ClResult<Parameter> {
		let id = param.split_once('-').map_or(param, |(id, _)| id);
		let param_id = id.parse::<i64>().map(ParamId).map_err(|_| Error::NotFound)?;

		self.read(caller, param_id).await
	}

	/// Change value and/or hidden flag in place
	pub async fn update(
		&self,
		caller: &Caller,
		param_id: ParamId,
		data: UpdateParameter,
	) -> ClResult<Parameter> {
		if !data.scope.is_undefined() {
			return Err(Error::ImmutableField("scope"));
		}
		if !data.priority.is_undefined() {
			return Err(Error::ImmutableField("priority"));
		}

		let current = self.adapter.read_parameter(param_id).await?;
		self.check_write(caller, &current.scope)?;

		// Decode only a kept value: one sealed with a lost key can still be overwritten
		let value = match data.value {
			Patch::Undefined if current.hidden => self.codec.decode(&current.value)?,
			Patch::Undefined => current.value.clone(),
			Patch::Null => "".into(),
			Patch::Value(value) => value,
		};
		let hidden = match data.hidden {
			Patch::Undefined => current.hidden,
			Patch::Null => false,
			Patch::Value(hidden) => hidden,
		};
		if hidden != current.hidden {
			debug!("Parameter {} hidden flag: {} -> {}", param_id, current.hidden, hidden);
		}

		let stored = self.stored_value(&value, hidden)?;
		let param = self
			.adapter
			.update_parameter(param_id, &UpdateParameterData { value: &stored, hidden })
			.await?;

		info!("Parameter '{}' updated on {} (id={})", param.name, param.scope, param_id);
		self.decoded(param)
	}

	/// Remove an override
	pub async fn delete(&self, caller: &Caller, param_id: ParamId, mode: DeleteMode) -> ClResult<()> {
		let param = match self.adapter.read_parameter(param_id).await {
			Ok(param) => param,
			Err(Error::NotFound) if mode == DeleteMode::Lenient => return Ok(()),
			Err(err) => return Err(err),
		};
		self.check_write(caller, &param.scope)?;

		let deleted = self.adapter.delete_parameter(param_id).await?;
		if !deleted && mode == DeleteMode::Strict {
			return Err(Error::NotFound);
		}

		info!("Parameter '{}' deleted from {} (id={})", param.name, param.scope, param_id);
		Ok(())
	}

	/// Cascade removal when the owning scope instance goes away
	pub async fn delete_by_scope(&self, caller: &Caller, scope: &ScopeRef) -> ClResult<u64> {
		self.check_write(caller, scope)?;
		let count = self.adapter.delete_by_scope(scope).await?;
		info!("{} parameter(s) removed with {}", count, scope);
		Ok(count)
	}

	/// List parameters visible to the caller. Hidden values the caller may not
	/// read come back as [`REDACTED`].
	pub async fn list(
		&self,
		caller: &Caller,
		opts: &ListParameterOptions,
	) -> ClResult<Vec<Parameter>> {
		let params = self.adapter.list_parameters(opts).await?;
		let mut res = Vec::with_capacity(params.len());
		for mut param in params {
			match self.visibility(caller, &param) {
				Visibility::Full => res.push(self.decoded(param)?),
				Visibility::Redacted => {
					param.value = REDACTED.into();
					res.push(param);
				}
				Visibility::None => {}
			}
		}
		Ok(res)
	}

	/// Entries for the search indexer, hidden values redacted
	pub async fn index<F>(
		&self,
		opts: &ListParameterOptions,
		scope_name: F,
	) -> ClResult<Vec<IndexEntry>>
	where
		F: Fn(&ScopeRef) -> Option<Box<str>> + Send + Sync,
	{
		let params = self.adapter.list_parameters(opts).await?;
		Ok(index_entries(&params, scope_name))
	}

	/// Effective value of `name` for a host
	///
	/// A hidden winner is only returned to callers allowed to read it.
	pub async fn resolve(
		&self,
		caller: &Caller,
		host: &HostContext,
		name: &str,
	) -> ClResult<Option<Resolved>> {
		let Some(mut resolved) = self.resolver.resolve(host, name).await? else {
			return Ok(None);
		};
		self.check_read(caller, &resolved.parameter)?;
		resolved.parameter = self.decoded(resolved.parameter)?;
		Ok(Some(resolved))
	}

	/// Effective values of every parameter visible to a host, keyed by name.
	///
	/// Hidden values the caller may not read are redacted.
	pub async fn resolve_all(
		&self,
		caller: &Caller,
		host: &HostContext,
	) -> ClResult<std::collections::BTreeMap<Box<str>, Resolved>> {
		let mut res = std::collections::BTreeMap::new();
		for (name, mut entry) in self.resolver.resolve_all(host).await? {
			match self.visibility(caller, &entry.parameter) {
				Visibility::Full => entry.parameter = self.decoded(entry.parameter)?,
				Visibility::Redacted => entry.parameter.value = REDACTED.into(),
				Visibility::None => continue,
			}
			res.insert(name, entry);
		}
		Ok(res)
	}

	/// Every applicable override of `name` for a host, winner first
	pub async fn explain(
		&self,
		caller: &Caller,
		host: &HostContext,
		name: &str,
	) -> ClResult<Vec<Parameter>> {
		let mut res = Vec::new();
		for mut param in self.resolver.explain(host, name).await? {
			match self.visibility(caller, &param) {
				Visibility::Full => param = self.decoded(param)?,
				Visibility::Redacted => param.value = REDACTED.into(),
				Visibility::None => continue,
			}
			res.push(param);
		}
		Ok(res)
	}

	fn visibility(&self, caller: &Caller, param: &Parameter) -> Visibility {
		if self.authorizer.can_read(caller, param) {
			Visibility::Full
		} else if param.hidden
			// Shown by name when the caller could read it were it not hidden
			&& self.authorizer.can_read(caller, &Parameter { hidden: false, ..param.clone() })
		{
			Visibility::Redacted
		} else {
			Visibility::None
		}
	}
}

enum Visibility {
	Full,
	Redacted,
	None,
}

// vim: ts=4
