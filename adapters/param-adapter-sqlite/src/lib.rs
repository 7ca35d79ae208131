//! SQLite implementation of the parameter adapter

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};
use std::path::Path;

use hostparam::param_adapter::{
	ListParameterOptions, NewParameter, ParamAdapter, UpdateParameterData,
};
use hostparam::prelude::*;
use hostparam::types::Parameter;

mod parameter;
mod schema;
mod utils;

use schema::init_db;

#[derive(Debug)]
pub struct ParamAdapterSqlite {
	db: SqlitePool,
}

impl ParamAdapterSqlite {
	/// Opens (creating if needed) the database file at `path`
	pub async fn new(path: impl AsRef<Path>) -> ClResult<Self> {
		let path = path.as_ref();
		if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
			tokio::fs::create_dir_all(dir).await?;
		}

		let opts = sqlite::SqliteConnectOptions::new()
			.filename(path)
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(|err| warn!("DbError: {:#?}", err))
			.or(Err(Error::StorageUnavailable))?;

		init_db(&db)
			.await
			.inspect_err(|err| warn!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		info!("Parameter store opened at {}", path.display());
		Ok(Self { db })
	}

	/// Closes the pool; further calls fail with `Error::StorageUnavailable`
	pub async fn close(&self) {
		self.db.close().await;
	}
}

#[async_trait]
impl ParamAdapter for ParamAdapterSqlite {
	async fn read_parameter(&self, param_id: ParamId) -> ClResult<Parameter> {
		parameter::read(&self.db, param_id).await
	}

	async fn find_by_scope(&self, scope: &ScopeRef, name: &str) -> ClResult<Option<Parameter>> {
		parameter::find_by_scope(&self.db, scope, name).await
	}

	async fn find_all_by_name_across_scopes(
		&self,
		name: &str,
		scopes: &[ScopeRef],
	) -> ClResult<Vec<Parameter>> {
		parameter::find_by_name(&self.db, name, scopes).await
	}

	async fn list_by_scopes(&self, scopes: &[ScopeRef]) -> ClResult<Vec<Parameter>> {
		parameter::list_by_scopes(&self.db, scopes).await
	}

	async fn list_parameters(&self, opts: &ListParameterOptions) -> ClResult<Vec<Parameter>> {
		parameter::list(&self.db, opts).await
	}

	async fn insert_parameter(&self, param: &NewParameter<'_>) -> ClResult<Parameter> {
		parameter::insert(&self.db, param).await
	}

	async fn update_parameter(
		&self,
		param_id: ParamId,
		data: &UpdateParameterData<'_>,
	) -> ClResult<Parameter> {
		parameter::update(&self.db, param_id, data).await
	}

	async fn delete_parameter(&self, param_id: ParamId) -> ClResult<bool> {
		parameter::delete(&self.db, param_id).await
	}

	async fn delete_by_scope(&self, scope: &ScopeRef) -> ClResult<u64> {
		parameter::delete_by_scope(&self.db, scope).await
	}
}

// vim: ts=4
