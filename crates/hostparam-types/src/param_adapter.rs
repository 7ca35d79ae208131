//! Adapter that stores parameters.
//!
//! The resolution core never talks to a database directly. Implementations must
//! enforce `(scope kind, reference id, name)` uniqueness atomically and report a
//! violation as `Error::DuplicateName`. An unreachable backend is reported as
//! `Error::StorageUnavailable`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::prelude::*;
use crate::types::Parameter;

/// Ordering of a parameter listing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListOrder {
	/// Lexicographic by name, then by id
	#[default]
	Name,
	/// Most specific first, then by name
	Priority,
	/// Creation order
	Id,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListParameterOptions {
	pub scope: Option<ScopeRef>,
	pub name: Option<Box<str>>,
	#[serde(default)]
	pub order: ListOrder,
}

/// Row to insert. `value` is already in its stored form.
#[derive(Clone, Debug)]
pub struct NewParameter<'a> {
	pub name: &'a str,
	pub value: &'a str,
	pub scope: ScopeRef,
	pub priority: i32,
	pub hidden: bool,
}

/// The mutable part of a stored parameter
#[derive(Clone, Debug)]
pub struct UpdateParameterData<'a> {
	pub value: &'a str,
	pub hidden: bool,
}

#[async_trait]
pub trait ParamAdapter: Debug + Send + Sync {
	/// Reads a parameter by id. Fails with `Error::NotFound` if absent.
	async fn read_parameter(&self, param_id: ParamId) -> ClResult<Parameter>;

	/// Finds the parameter occupying `name` in exactly this scope
	async fn find_by_scope(&self, scope: &ScopeRef, name: &str) -> ClResult<Option<Parameter>>;

	/// Every parameter called `name` attached to one of `scopes`
	async fn find_all_by_name_across_scopes(
		&self,
		name: &str,
		scopes: &[ScopeRef],
	) -> ClResult<Vec<Parameter>>;

	/// Every parameter attached to one of `scopes`, ordered by name
	async fn list_by_scopes(&self, scopes: &[ScopeRef]) -> ClResult<Vec<Parameter>>;

	async fn list_parameters(&self, opts: &ListParameterOptions) -> ClResult<Vec<Parameter>>;

	/// Inserts a parameter, assigning a fresh id that is never reused
	async fn insert_parameter(&self, param: &NewParameter<'_>) -> ClResult<Parameter>;

	async fn update_parameter(
		&self,
		param_id: ParamId,
		data: &UpdateParameterData<'_>,
	) -> ClResult<Parameter>;

	/// Returns false if the parameter did not exist
	async fn delete_parameter(&self, param_id: ParamId) -> ClResult<bool>;

	/// Removes every parameter owned by a scope instance (cascade on scope removal)
	async fn delete_by_scope(&self, scope: &ScopeRef) -> ClResult<u64>;
}

// vim: ts=4
