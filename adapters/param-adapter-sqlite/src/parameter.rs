//! Parameter storage
//!
//! One row per parameter. The `(type, reference_id, name)` unique key is what
//! guarantees name uniqueness inside a scope instance, so concurrent inserts
//! race in the database rather than in the caller.

use sqlx::SqlitePool;

use hostparam::param_adapter::{ListOrder, ListParameterOptions, NewParameter, UpdateParameterData};
use hostparam::prelude::*;
use hostparam::types::Parameter;

use crate::utils::*;

pub(crate) async fn read(db: &SqlitePool, param_id: ParamId) -> ClResult<Parameter> {
	let row = sqlx::query(&format!("SELECT {} FROM parameters WHERE param_id = ?", PARAM_COLS))
		.bind(param_id.0)
		.fetch_one(db)
		.await
		.map_err(map_db_err)?;

	parameter_from_row(&row)
}

pub(crate) async fn find_by_scope(
	db: &SqlitePool,
	scope: &ScopeRef,
	name: &str,
) -> ClResult<Option<Parameter>> {
	let (typ, ref_id) = scope_key(scope);
	let row = sqlx::query(&format!(
		"SELECT {} FROM parameters WHERE type = ? AND reference_id = ? AND name = ?",
		PARAM_COLS
	))
	.bind(typ)
	.bind(ref_id)
	.bind(name)
	.fetch_optional(db)
	.await
	.map_err(map_db_err)?;

	row.as_ref().map(parameter_from_row).transpose()
}

pub(crate) async fn find_by_name(
	db: &SqlitePool,
	name: &str,
	scopes: &[ScopeRef],
) -> ClResult<Vec<Parameter>> {
	if scopes.is_empty() {
		return Ok(Vec::new());
	}

	let mut query = sqlx::QueryBuilder::new(format!("SELECT {} FROM parameters WHERE name=", PARAM_COLS));
	query.push_bind(name).push(" AND ");
	push_scopes(&mut query, scopes);
	query.push(" ORDER BY priority DESC, param_id");

	let rows = query.build().fetch_all(db).await.map_err(map_db_err)?;
	collect_params(&rows)
}

pub(crate) async fn list_by_scopes(db: &SqlitePool, scopes: &[ScopeRef]) -> ClResult<Vec<Parameter>> {
	if scopes.is_empty() {
		return Ok(Vec::new());
	}

	let mut query = sqlx::QueryBuilder::new(format!("SELECT {} FROM parameters WHERE ", PARAM_COLS));
	push_scopes(&mut query, scopes);
	query.push(" ORDER BY name, param_id");

	let rows = query.build().fetch_all(db).await.map_err(map_db_err)?;
	collect_params(&rows)
}

pub(crate) async fn list(db: &SqlitePool, opts: &ListParameterOptions) -> ClResult<Vec<Parameter>> {
	let mut query = sqlx::QueryBuilder::new(format!("SELECT {} FROM parameters WHERE 1=1", PARAM_COLS));

	if let Some(scope) = &opts.scope {
		let (typ, ref_id) = scope_key(scope);
		query.push(" AND type=").push_bind(typ).push(" AND reference_id=").push_bind(ref_id);
	}
	if let Some(name) = &opts.name {
		query.push(" AND name=").push_bind(name.as_ref());
	}

	query.push(match opts.order {
		ListOrder::Name => " ORDER BY name, param_id",
		ListOrder::Priority => " ORDER BY priority DESC, name, param_id",
		ListOrder::Id => " ORDER BY param_id",
	});

	let rows = query.build().fetch_all(db).await.map_err(map_db_err)?;
	collect_params(&rows)
}

pub(crate) async fn insert(db: &SqlitePool, param: &NewParameter<'_>) -> ClResult<Parameter> {
	let (typ, ref_id) = scope_key(&param.scope);
	let res = sqlx::query(&format!(
		"INSERT INTO parameters (name, value, type, reference_id, priority, hidden)
		VALUES (?, ?, ?, ?, ?, ?) RETURNING {}",
		PARAM_COLS
	))
	.bind(param.name)
	.bind(param.value)
	.bind(typ)
	.bind(ref_id)
	.bind(param.priority)
	.bind(param.hidden)
	.fetch_one(db)
	.await;

	match res {
		Ok(row) => parameter_from_row(&row),
		Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
			debug!("Duplicate parameter {} in {}", param.name, param.scope);
			Err(Error::DuplicateName { name: param.name.into(), scope: param.scope })
		}
		Err(err) => Err(map_db_err(err)),
	}
}

pub(crate) async fn update(
	db: &SqlitePool,
	param_id: ParamId,
	data: &UpdateParameterData<'_>,
) -> ClResult<Parameter> {
	let row = sqlx::query(&format!(
		"UPDATE parameters SET value = ?, hidden = ?, updated_at = unixepoch()
		WHERE param_id = ? RETURNING {}",
		PARAM_COLS
	))
	.bind(data.value)
	.bind(data.hidden)
	.bind(param_id.0)
	.fetch_optional(db)
	.await
	.map_err(map_db_err)?
	.ok_or(Error::NotFound)?;

	parameter_from_row(&row)
}

pub(crate) async fn delete(db: &SqlitePool, param_id: ParamId) -> ClResult<bool> {
	let res = sqlx::query("DELETE FROM parameters WHERE param_id = ?")
		.bind(param_id.0)
		.execute(db)
		.await
		.map_err(map_db_err)?;

	Ok(res.rows_affected() > 0)
}

pub(crate) async fn delete_by_scope(db: &SqlitePool, scope: &ScopeRef) -> ClResult<u64> {
	let (typ, ref_id) = scope_key(scope);
	let res = sqlx::query("DELETE FROM parameters WHERE type = ? AND reference_id = ?")
		.bind(typ)
		.bind(ref_id)
		.execute(db)
		.await
		.map_err(map_db_err)?;

	Ok(res.rows_affected())
}

// vim: ts=4
