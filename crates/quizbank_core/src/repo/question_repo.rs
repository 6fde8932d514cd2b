//! Question repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Own every transaction boundary over the `questions` and `options` tables.
//! - Map rows back into [`Question`] / [`QuestionOption`] values.
//!
//! # Invariants
//! - A question and its options are written as one unit: each write runs in
//!   a single transaction that either commits fully or rolls back.
//! - Updates replace the whole option set (delete then insert), never merge.
//! - Options are read back in insertion order (`options.id ASC`).
//! - Reads never return partial results; any row failure aborts the call.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::question::{Question, QuestionId, QuestionOption};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const SELECT_OPTIONS_SQL: &str = "SELECT body, correct
FROM options
WHERE question_id = ?1
ORDER BY id ASC;";

const INSERT_OPTION_SQL: &str =
    "INSERT INTO options (question_id, body, correct) VALUES (?1, ?2, ?3);";

const DELETE_OPTIONS_SQL: &str = "DELETE FROM options WHERE question_id = ?1;";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for question persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Update targeted an id with no question row. Nothing was written.
    NotFound(QuestionId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "question not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted question data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it through `db::open_db`"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table missing: {table}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
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

/// Repository interface for question CRUD.
///
/// Writes take `&mut self` because each one opens a transaction on the
/// underlying connection.
pub trait QuestionRepository {
    /// Returns every question with its options, ordered by id.
    fn list_questions(&self) -> RepoResult<Vec<Question>>;
    /// Returns one question with its options, if it exists.
    fn get_question(&self, id: QuestionId) -> RepoResult<Option<Question>>;
    /// Inserts the question and all of its options; returns the new id.
    fn create_question(&mut self, question: &Question) -> RepoResult<QuestionId>;
    /// Replaces body and the full option set of an existing question.
    fn update_question(&mut self, id: QuestionId, question: &Question) -> RepoResult<()>;
    /// Removes the question and its options. Missing ids are a no-op.
    fn delete_question(&mut self, id: QuestionId) -> RepoResult<()>;
}

/// SQLite-backed question repository.
pub struct SqliteQuestionRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteQuestionRepository<'conn> {
    /// Wraps a connection obtained from [`crate::db::open_db`] or
    /// [`crate::db::open_db_in_memory`].
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` when the schema is not the expected one.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn begin(&mut self) -> RepoResult<Transaction<'_>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(tx)
    }
}

impl QuestionRepository for SqliteQuestionRepository<'_> {
    fn list_questions(&self) -> RepoResult<Vec<Question>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, body FROM questions ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut questions = Vec::new();

        while let Some(row) = rows.next()? {
            let id: QuestionId = row.get("id")?;
            questions.push(Question {
                id,
                body: row.get("body")?,
                options: load_options(self.conn, id)?,
            });
        }

        Ok(questions)
    }

    fn get_question(&self, id: QuestionId) -> RepoResult<Option<Question>> {
        let body: Option<String> = self
            .conn
            .query_row("SELECT body FROM questions WHERE id = ?1;", [id], |row| {
                row.get(0)
            })
            .optional()?;

        match body {
            Some(body) => Ok(Some(Question {
                id,
                body,
                options: load_options(self.conn, id)?,
            })),
            None => Ok(None),
        }
    }

    fn create_question(&mut self, question: &Question) -> RepoResult<QuestionId> {
        let tx = self.begin()?;

        tx.execute(
            "INSERT INTO questions (body) VALUES (?1);",
            [question.body.as_str()],
        )?;
        let id = tx.last_insert_rowid();
        insert_options(&tx, id, &question.options)?;

        tx.commit()?;
        Ok(id)
    }

    fn update_question(&mut self, id: QuestionId, question: &Question) -> RepoResult<()> {
        let tx = self.begin()?;

        let changed = tx.execute(
            "UPDATE questions SET body = ?1 WHERE id = ?2;",
            params![question.body.as_str(), id],
        )?;
        if changed == 0 {
            // Dropping `tx` rolls back; no orphaned options get written.
            return Err(RepoError::NotFound(id));
        }

        tx.execute(DELETE_OPTIONS_SQL, [id])?;
        insert_options(&tx, id, &question.options)?;

        tx.commit()?;
        Ok(())
    }

    fn delete_question(&mut self, id: QuestionId) -> RepoResult<()> {
        let tx = self.begin()?;

        // Children first: foreign keys are enforced per statement.
        tx.execute(DELETE_OPTIONS_SQL, [id])?;
        tx.execute("DELETE FROM questions WHERE id = ?1;", [id])?;

        tx.commit()?;
        Ok(())
    }
}

fn insert_options(
    tx: &Transaction<'_>,
    id: QuestionId,
    options: &[QuestionOption],
) -> RepoResult<()> {
    let mut stmt = tx.prepare_cached(INSERT_OPTION_SQL)?;
    for option in options {
        stmt.execute(params![id, option.body.as_str(), option.correct])?;
    }
    Ok(())
}

fn load_options(conn: &Connection, id: QuestionId) -> RepoResult<Vec<QuestionOption>> {
    let mut stmt = conn.prepare_cached(SELECT_OPTIONS_SQL)?;
    let mut rows = stmt.query([id])?;
    let mut options = Vec::new();
    while let Some(row) = rows.next()? {
        options.push(parse_option_row(row, id)?);
    }
    Ok(options)
}

fn parse_option_row(row: &Row<'_>, question_id: QuestionId) -> RepoResult<QuestionOption> {
    let correct = match row.get::<_, i64>("correct")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid correct value `{other}` in options.correct for question {question_id}"
            )));
        }
    };

    Ok(QuestionOption {
        body: row.get("body")?,
        correct,
    })
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let actual_version = current_version(conn)?;
    let expected_version = latest_version();
    if actual_version > expected_version {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: actual_version,
            latest_supported: expected_version,
        }
        .into());
    }
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["questions", "options"] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
