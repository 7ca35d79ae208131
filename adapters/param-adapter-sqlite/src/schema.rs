//! Database schema initialization

use sqlx::SqlitePool;

/// Initialize the database schema with all required tables and indexes
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	// Parameters
	//************
	// reference_id is 0 for the common scope so the unique key also covers it
	// (NULLs never collide in a SQLite UNIQUE index)
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS parameters (
		param_id integer NOT NULL PRIMARY KEY AUTOINCREMENT,
		name varchar(255) NOT NULL,
		value text NOT NULL,
		type varchar(32) NOT NULL,
		reference_id integer NOT NULL DEFAULT 0,
		priority integer NOT NULL,
		hidden boolean NOT NULL DEFAULT 0,
		created_at integer NOT NULL DEFAULT (unixepoch()),
		updated_at integer NOT NULL DEFAULT (unixepoch()),
		UNIQUE(type, reference_id, name)
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_parameters_name ON parameters(name)")
		.execute(&mut *tx)
		.await?;

	tx.commit().await?;

	Ok(())
}

// vim: ts=4
