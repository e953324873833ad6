//! The question catalog contract and an in-memory implementation.

use std::future::Future;

use dashmap::DashMap;
use duelquiz_protocol::{AnswerOption, Field, FieldId, QuestionId};
use serde::{Deserialize, Serialize};

use crate::sampling::{sample_without_replacement, RandomSource};
use crate::CatalogError;

/// A question as stored: text, field, and its one correct option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question_id: QuestionId,
    pub question_text: String,
    pub field: Field,
    pub correct_answer: AnswerOption,
}

/// Read-only access to trivia content.
///
/// The coordinator only ever reads. Writes (authoring questions) belong
/// to whatever owns the store.
pub trait QuestionCatalog: Send + Sync + 'static {
    /// Looks up one question.
    ///
    /// # Errors
    /// [`CatalogError::QuestionNotFound`] for an unknown id.
    fn get_question(
        &self,
        question_id: QuestionId,
    ) -> impl Future<Output = Result<Question, CatalogError>> + Send;

    /// Every question id, in no particular order.
    fn list_question_ids(
        &self,
    ) -> impl Future<Output = Result<Vec<QuestionId>, CatalogError>> + Send;

    /// Up to `count` correct options of *other* questions in `field_id`,
    /// sampled uniformly without replacement.
    ///
    /// Returns fewer than `count` when the field is small. Only the
    /// question `exclude` is skipped; an option whose text matches the
    /// excluded question's answer may still appear.
    fn sample_other_options(
        &self,
        field_id: FieldId,
        exclude: QuestionId,
        count: usize,
    ) -> impl Future<Output = Result<Vec<AnswerOption>, CatalogError>> + Send;
}

// ---------------------------------------------------------------------------
// InMemoryCatalog
// ---------------------------------------------------------------------------

/// A [`QuestionCatalog`] kept in a concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    questions: DashMap<QuestionId, Question>,
    random: RandomSource,
}

impl InMemoryCatalog {
    /// An empty catalog sampling with thread-local randomness.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty catalog whose samples are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            questions: DashMap::new(),
            random: RandomSource::seeded(seed),
        }
    }

    /// Adds or replaces a question.
    pub fn insert(&self, question: Question) {
        self.questions.insert(question.question_id, question);
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Correct options of every question in `field_id` except `exclude`,
    /// ordered by question id so a seeded sample is stable.
    fn field_pool(
        &self,
        field_id: FieldId,
        exclude: QuestionId,
    ) -> Vec<AnswerOption> {
        let mut pool: Vec<(QuestionId, AnswerOption)> = self
            .questions
            .iter()
            .filter(|q| {
                q.field.field_id == field_id && q.question_id != exclude
            })
            .map(|q| (q.question_id, q.correct_answer.clone()))
            .collect();
        pool.sort_by_key(|(id, _)| *id);
        pool.into_iter().map(|(_, option)| option).collect()
    }
}

impl QuestionCatalog for InMemoryCatalog {
    async fn get_question(
        &self,
        question_id: QuestionId,
    ) -> Result<Question, CatalogError> {
        self.questions
            .get(&question_id)
            .map(|q| q.clone())
            .ok_or(CatalogError::QuestionNotFound(question_id))
    }

    async fn list_question_ids(&self) -> Result<Vec<QuestionId>, CatalogError> {
        let mut ids: Vec<QuestionId> =
            self.questions.iter().map(|q| *q.key()).collect();
        ids.sort();
        Ok(ids)
    }

    async fn sample_other_options(
        &self,
        field_id: FieldId,
        exclude: QuestionId,
        count: usize,
    ) -> Result<Vec<AnswerOption>, CatalogError> {
        let pool = self.field_pool(field_id, exclude);
        Ok(self
            .random
            .with_rng(|rng| sample_without_replacement(&pool, count, rng)))
    }
}
