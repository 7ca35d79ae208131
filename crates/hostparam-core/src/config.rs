//! Runtime configuration, read from the environment

use std::{env, path::PathBuf};

use crate::codec::ChaChaCodec;
use crate::prelude::*;

pub const ENV_DB_DIR: &str = "HOSTPARAM_DB_DIR";
pub const ENV_HIDDEN_KEY: &str = "HOSTPARAM_HIDDEN_KEY";
pub const ENV_HIDDEN_KEY_ID: &str = "HOSTPARAM_HIDDEN_KEY_ID";
pub const ENV_STRICT_DELETE: &str = "HOSTPARAM_STRICT_DELETE";

const DEFAULT_KEY_ID: &str = "v1";

#[derive(Clone)]
pub struct CoreConfig {
	/// Directory holding the parameter database
	pub db_dir: PathBuf,
	/// Base64 encoded 32 byte key for hidden values
	pub hidden_key: Option<Box<str>>,
	pub hidden_key_id: Box<str>,
	/// Deleting a missing parameter fails with NotFound instead of succeeding
	pub strict_delete: bool,
}

impl std::fmt::Debug for CoreConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CoreConfig")
			.field("db_dir", &self.db_dir)
			.field("hidden_key", &self.hidden_key.as_ref().map(|_| "<redacted>"))
			.field("hidden_key_id", &self.hidden_key_id)
			.field("strict_delete", &self.strict_delete)
			.finish()
	}
}

impl Default for CoreConfig {
	fn default() -> Self {
		Self {
			db_dir: PathBuf::from("./data"),
			hidden_key: None,
			hidden_key_id: DEFAULT_KEY_ID.into(),
			strict_delete: false,
		}
	}
}

impl CoreConfig {
	pub fn from_env() -> ClResult<Self> {
		Self::from_lookup(|key| env::var(key).ok())
	}

	/// Same as `from_env` with an explicit variable source
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ClResult<Self> {
		let non_empty = |key: &str| {
			lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
		};
		let defaults = Self::default();

		let strict_delete = match non_empty(ENV_STRICT_DELETE).as_deref() {
			None | Some("0" | "false" | "no") => false,
			Some("1" | "true" | "yes") => true,
			Some(other) => {
				return Err(Error::ConfigError(format!(
					"{} must be a boolean, got '{}'",
					ENV_STRICT_DELETE, other
				)));
			}
		};

		Ok(Self {
			db_dir: non_empty(ENV_DB_DIR).map_or(defaults.db_dir, PathBuf::from),
			hidden_key: non_empty(ENV_HIDDEN_KEY).map(Into::into),
			hidden_key_id: non_empty(ENV_HIDDEN_KEY_ID).map_or(defaults.hidden_key_id, Into::into),
			strict_delete,
		})
	}

	/// Database file inside `db_dir`
	pub fn db_path(&self) -> PathBuf {
		self.db_dir.join("params.db")
	}

	/// Codec for hidden values. Without a configured key an ephemeral one is generated.
	pub fn codec(&self) -> ClResult<ChaChaCodec> {
		match &self.hidden_key {
			Some(key) => ChaChaCodec::from_base64_key(self.hidden_key_id.clone(), key),
			None => {
				warn!(
					"{} is not set, hidden values are sealed with an ephemeral key",
					ENV_HIDDEN_KEY
				);
				ChaChaCodec::generate(self.hidden_key_id.clone())
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let vars: HashMap<String, String> =
			vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
		move |key| vars.get(key).cloned()
	}

	#[test]
	fn test_defaults() {
		let config = CoreConfig::from_lookup(lookup(&[])).unwrap();
		assert_eq!(config.db_dir, PathBuf::from("./data"));
		assert_eq!(config.hidden_key_id.as_ref(), "v1");
		assert!(config.hidden_key.is_none());
		assert!(!config.strict_delete);
	}

	#[test]
	fn test_overrides() {
		let config = CoreConfig::from_lookup(lookup(&[
			(ENV_DB_DIR, "/var/lib/hostparam"),
			(ENV_HIDDEN_KEY_ID, "k2"),
			(ENV_STRICT_DELETE, "true"),
		]))
		.unwrap();
		assert_eq!(config.db_path(), PathBuf::from("/var/lib/hostparam/params.db"));
		assert_eq!(config.hidden_key_id.as_ref(), "k2");
		assert!(config.strict_delete);
	}

	#[test]
	fn test_bad_boolean() {
		let res = CoreConfig::from_lookup(lookup(&[(ENV_STRICT_DELETE, "maybe")]));
		assert!(matches!(res, Err(Error::ConfigError(_))));
	}

	#[test]
	fn test_debug_redacts_key() {
		let config = CoreConfig { hidden_key: Some("c2VjcmV0".into()), ..CoreConfig::default() };
		let printed = format!("{:?}", config);
		assert!(!printed.contains("c2VjcmV0"));
	}
}

// vim: ts=4
