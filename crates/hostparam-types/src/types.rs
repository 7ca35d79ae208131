//! Common types used throughout hostparam.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::SystemTime;

use crate::prelude::*;

// ParamId //
//*********//
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamId(pub i64);

impl std::fmt::Display for ParamId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

// RefId //
//*******//
/// Id of the entity owning a scope (a host, a host group, a domain, ...)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefId(pub i64);

impl std::fmt::Display for RefId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<i64> for RefId {
	fn from(id: i64) -> Self {
		RefId(id)
	}
}

impl From<i32> for RefId {
	fn from(id: i32) -> Self {
		RefId(i64::from(id))
	}
}

// Timestamp //
//***********//
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn now() -> Timestamp {
		let res = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
		Timestamp(res.as_secs().try_into().unwrap_or(i64::MAX))
	}
}

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

// Patch //
//*******//
/// Three-state field for partial updates: absent, explicitly null, or a value
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Patch<T> {
	#[default]
	Undefined,
	Null,
	Value(T),
}

impl<T> Patch<T> {
	pub fn is_undefined(&self) -> bool {
		matches!(self, Patch::Undefined)
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Patch::Null)
	}

	pub fn is_value(&self) -> bool {
		matches!(self, Patch::Value(_))
	}

	pub fn value(&self) -> Option<&T> {
		match self {
			Patch::Value(v) => Some(v),
			_ => None,
		}
	}
}

impl<T: Serialize> Serialize for Patch<T> {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Patch::Value(v) => v.serialize(serializer),
			_ => serializer.serialize_none(),
		}
	}
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		// Missing fields never reach here; they fall back to Default (Undefined)
		Ok(match Option::<T>::deserialize(deserializer)? {
			Some(v) => Patch::Value(v),
			None => Patch::Null,
		})
	}
}

// Parameter //
//***********//
/// A named override attached to one scope instance.
///
/// `value` holds the stored form: encoded when `hidden` is set. Services hand
/// out copies with the value decoded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
	pub param_id: ParamId,
	pub name: Box<str>,
	pub value: Box<str>,
	pub scope: ScopeRef,
	pub priority: i32,
	pub hidden: bool,
	pub created_at: Timestamp,
	pub updated_at: Timestamp,
}

impl Parameter {
	pub fn scope_kind(&self) -> ScopeKind {
		self.scope.kind()
	}

	pub fn reference_id(&self) -> Option<RefId> {
		self.scope.reference_id()
	}
}


// vim: ts=4
