//! Question use-case service.
//!
//! # Responsibility
//! - Provide the CRUD entry points used by outer layers (CLI, HTTP, ...).
//! - Emit metadata-only diagnostic events for every store call.
//!
//! # Invariants
//! - Question and option text never reaches the logs.
//! - Repository errors are returned unchanged.

use crate::model::question::{Question, QuestionId};
use crate::repo::question_repo::{QuestionRepository, RepoResult};
use log::{error, info};
use std::time::Instant;

/// Use-case wrapper around a [`QuestionRepository`].
pub struct QuestionService<R: QuestionRepository> {
    repo: R,
}

impl<R: QuestionRepository> QuestionService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists all questions with their options.
    pub fn list_questions(&self) -> RepoResult<Vec<Question>> {
        let started_at = Instant::now();
        let result = self.repo.list_questions();
        match &result {
            Ok(questions) => info!(
                "event=question_list module=service status=ok count={} duration_ms={}",
                questions.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("question_list", None, started_at, err),
        }
        result
    }

    /// Fetches one question by id.
    pub fn get_question(&self, id: QuestionId) -> RepoResult<Option<Question>> {
        let started_at = Instant::now();
        let result = self.repo.get_question(id);
        match &result {
            Ok(found) => info!(
                "event=question_get module=service status=ok question_id={id} found={} duration_ms={}",
                found.is_some(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("question_get", Some(id), started_at, err),
        }
        result
    }

    /// Persists a new question and returns its store-assigned id.
    pub fn create_question(&mut self, question: &Question) -> RepoResult<QuestionId> {
        let started_at = Instant::now();
        let result = self.repo.create_question(question);
        match &result {
            Ok(id) => info!(
                "event=question_create module=service status=ok question_id={id} option_count={} duration_ms={}",
                question.options.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("question_create", None, started_at, err),
        }
        result
    }

    /// Replaces body and options of question `id`.
    ///
    /// Returns `RepoError::NotFound` when `id` does not exist.
    pub fn update_question(&mut self, id: QuestionId, question: &Question) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = self.repo.update_question(id, question);
        match &result {
            Ok(()) => info!(
                "event=question_update module=service status=ok question_id={id} option_count={} duration_ms={}",
                question.options.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("question_update", Some(id), started_at, err),
        }
        result
    }

    /// Deletes question `id` and its options. Deleting twice is not an error.
    pub fn delete_question(&mut self, id: QuestionId) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = self.repo.delete_question(id);
        match &result {
            Ok(()) => info!(
                "event=question_delete module=service status=ok question_id={id} duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("question_delete", Some(id), started_at, err),
        }
        result
    }
}

fn log_failure(
    event: &str,
    id: Option<QuestionId>,
    started_at: Instant,
    err: &dyn std::error::Error,
) {
    match id {
        Some(id) => error!(
            "event={event} module=service status=error question_id={id} duration_ms={} error={err}",
            started_at.elapsed().as_millis()
        ),
        None => error!(
            "event={event} module=service status=error duration_ms={} error={err}",
            started_at.elapsed().as_millis()
        ),
    }
}
