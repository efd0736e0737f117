//! Forageable store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide point lookup, listing, insert, update and delete over the
//!   `forageables` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths validate required fields before any SQL mutation.
//! - Ids come from `AUTOINCREMENT` and are never reused after deletion.
//! - `update` and `delete` report `NotFound` when no row matches.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::{latest_version, schema_version};
use crate::db::DbError;
use crate::model::forageable::{
    Forageable, ForageableId, ForageableInput, ForageableValidationError,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const FORAGEABLE_SELECT_SQL: &str = "SELECT
    id,
    name,
    location_address,
    notes,
    in_season,
    remind_text
FROM forageables";

const FORAGEABLES_TABLE: &str = "forageables";
const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "name",
    "location_address",
    "notes",
    "in_season",
    "remind_text",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Store-level error for forageable persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Required field empty on insert/update.
    Validation(ForageableValidationError),
    /// Underlying SQLite or bootstrap failure.
    Db(DbError),
    /// No row with this id.
    NotFound(ForageableId),
    /// A stored row violates model invariants.
    InvalidData(String),
    /// Connection was not bootstrapped through `open_db*`.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "forageable not found: {id}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted forageable data: {message}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ForageableValidationError> for RepoError {
    fn from(value: ForageableValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable storage of forageable records keyed by id.
pub trait ForageableStore {
    /// Returns the record with `id`, or `None` when absent.
    fn get(&self, id: ForageableId) -> RepoResult<Option<Forageable>>;
    /// Returns every record in insertion order.
    fn list(&self) -> RepoResult<Vec<Forageable>>;
    /// Persists a new record and returns the id storage assigned to it.
    fn insert(&self, input: &ForageableInput) -> RepoResult<ForageableId>;
    /// Replaces every field except `id`.
    fn update(&self, id: ForageableId, input: &ForageableInput) -> RepoResult<()>;
    /// Removes the record; absent ids fail with `NotFound`.
    fn delete(&self, id: ForageableId) -> RepoResult<()>;
}

/// SQLite-backed forageable store.
pub struct SqliteForageableStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteForageableStore<'conn> {
    /// Wraps a connection produced by `open_db`/`open_db_in_memory`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `user_version` is not the latest.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the schema is
    ///   not the one migrations produce.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ForageableStore for SqliteForageableStore<'_> {
    fn get(&self, id: ForageableId) -> RepoResult<Option<Forageable>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{FORAGEABLE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_forageable_row(row)?)),
            None => Ok(None),
        }
    }

    fn list(&self) -> RepoResult<Vec<Forageable>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{FORAGEABLE_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_forageable_row(row)?);
        }
        Ok(records)
    }

    fn insert(&self, input: &ForageableInput) -> RepoResult<ForageableId> {
        input.validate()?;

        self.conn.execute(
            "INSERT INTO forageables (
                name,
                location_address,
                notes,
                in_season,
                remind_text
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                input.name.as_str(),
                input.location_address.as_str(),
                input.notes.as_str(),
                input.in_season,
                input.remind_text.as_str(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update(&self, id: ForageableId, input: &ForageableInput) -> RepoResult<()> {
        input.validate()?;

        let changed = self.conn.execute(
            "UPDATE forageables
             SET
                name = ?1,
                location_address = ?2,
                notes = ?3,
                in_season = ?4,
                remind_text = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?6;",
            params![
                input.name.as_str(),
                input.location_address.as_str(),
                input.notes.as_str(),
                input.in_season,
                input.remind_text.as_str(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn delete(&self, id: ForageableId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM forageables WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1;",
            [FORAGEABLES_TABLE],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    if !table_exists {
        return Err(RepoError::MissingRequiredTable(FORAGEABLES_TABLE));
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({FORAGEABLES_TABLE});"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;
    for &column in REQUIRED_COLUMNS {
        if !columns.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: FORAGEABLES_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn parse_forageable_row(row: &Row<'_>) -> RepoResult<Forageable> {
    let id: ForageableId = row.get("id")?;
    let in_season = match row.get::<_, i64>("in_season")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid in_season value `{other}` in forageables.in_season (id={id})"
            )));
        }
    };

    let input = ForageableInput {
        name: row.get("name")?,
        location_address: row.get("location_address")?,
        notes: row.get("notes")?,
        in_season,
        remind_text: row.get("remind_text")?,
    };
    input.validate().map_err(|err| {
        RepoError::InvalidData(format!("stored forageable {id} violates invariants: {err}"))
    })?;

    Ok(Forageable::from_input(id, input))
}
