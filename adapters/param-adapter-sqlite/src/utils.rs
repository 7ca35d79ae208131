//! Row mapping and error translation shared by the query modules

use std::str::FromStr;

use sqlx::{Row, sqlite::SqliteRow};

use hostparam::prelude::*;
use hostparam::types::Parameter;

pub(crate) const PARAM_COLS: &str =
	"param_id, name, value, type, reference_id, priority, hidden, created_at, updated_at";

/// Log database error for debugging
pub(crate) fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

/// Translate a driver error that is not handled more specifically by the caller
pub(crate) fn map_db_err(err: sqlx::Error) -> Error {
	match err {
		sqlx::Error::RowNotFound => Error::NotFound,
		sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
			inspect(&err);
			Error::StorageUnavailable
		}
		err => {
			inspect(&err);
			Error::DbError
		}
	}
}

/// Column pair a scope is stored under. The common scope uses reference id 0.
pub(crate) fn scope_key(scope: &ScopeRef) -> (&'static str, i64) {
	(scope.kind().type_name(), scope.reference_id().map_or(0, |id| id.0))
}

/// Appends `((type=? AND reference_id=?) OR ...)` for a non-empty scope list
pub(crate) fn push_scopes(query: &mut sqlx::QueryBuilder<'_, sqlx::Sqlite>, scopes: &[ScopeRef]) {
	query.push("(");
	for (i, scope) in scopes.iter().enumerate() {
		if i > 0 {
			query.push(" OR ");
		}
		let (typ, ref_id) = scope_key(scope);
		query.push("(type=").push_bind(typ).push(" AND reference_id=").push_bind(ref_id).push(")");
	}
	query.push(")");
}

pub(crate) fn parameter_from_row(row: &SqliteRow) -> ClResult<Parameter> {
	let typ: &str = row.try_get("type").map_err(map_db_err)?;
	let kind = ScopeKind::from_str(typ).inspect_err(|_| warn!("Unknown scope kind in row: {}", typ))?;
	let ref_id: i64 = row.try_get("reference_id").map_err(map_db_err)?;
	let scope = ScopeRef::from_parts(
		kind,
		if kind == ScopeKind::Common { None } else { Some(RefId(ref_id)) },
	)?;
	let priority: i32 = row.try_get("priority").map_err(map_db_err)?;
	if priority != kind.priority() {
		warn!("Stored priority {} for {} does not match its kind", priority, scope);
		return Err(Error::PriorityMismatch { scope, priority });
	}

	Ok(Parameter {
		param_id: ParamId(row.try_get("param_id").map_err(map_db_err)?),
		name: row.try_get::<String, _>("name").map_err(map_db_err)?.into_boxed_str(),
		value: row.try_get::<String, _>("value").map_err(map_db_err)?.into_boxed_str(),
		scope,
		priority,
		hidden: row.try_get("hidden").map_err(map_db_err)?,
		created_at: Timestamp(row.try_get("created_at").map_err(map_db_err)?),
		updated_at: Timestamp(row.try_get("updated_at").map_err(map_db_err)?),
	})
}

/// Map every row, failing on the first one that does not parse
pub(crate) fn collect_params(rows: &[SqliteRow]) -> ClResult<Vec<Parameter>> {
	rows.iter().map(parameter_from_row).collect()
}

// vim: ts=4
