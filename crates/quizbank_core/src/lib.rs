//! Core data-access layer for quizbank: questions and their answer options
//! persisted in SQLite.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::question::{Question, QuestionId, QuestionOption};
pub use repo::question_repo::{
    QuestionRepository, RepoError, RepoResult, SqliteQuestionRepository,
};
pub use service::question_service::QuestionService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
