//! Card assembly: a question plus its correct answer and distractors.

use std::sync::Arc;

use duelquiz_protocol::{QuestionCard, QuestionId};

use crate::sampling::{pick_uniform, RandomSource};
use crate::{CatalogError, QuestionCatalog};

/// How many distractors a card carries at most.
pub const DISTRACTOR_COUNT: usize = 3;

/// Builds [`QuestionCard`]s from a [`QuestionCatalog`].
pub struct CardDealer<C> {
    catalog: Arc<C>,
    random: RandomSource,
}

impl<C: QuestionCatalog> CardDealer<C> {
    /// A dealer that picks random questions with thread-local randomness.
    pub fn new(catalog: Arc<C>) -> Self {
        Self {
            catalog,
            random: RandomSource::entropy(),
        }
    }

    /// A dealer whose random question choice is reproducible.
    pub fn with_seed(catalog: Arc<C>, seed: u64) -> Self {
        Self {
            catalog,
            random: RandomSource::seeded(seed),
        }
    }

    pub fn catalog(&self) -> &Arc<C> {
        &self.catalog
    }

    /// Builds the card for one question.
    ///
    /// # Errors
    /// [`CatalogError::QuestionNotFound`] for an unknown id, or whatever
    /// the catalog reports.
    pub async fn card_by_id(
        &self,
        question_id: QuestionId,
    ) -> Result<QuestionCard, CatalogError> {
        let question = self.catalog.get_question(question_id).await?;
        let distractors = self
            .catalog
            .sample_other_options(
                question.field.field_id,
                question.question_id,
                DISTRACTOR_COUNT,
            )
            .await?;

        tracing::debug!(
            %question_id,
            distractors = distractors.len(),
            "card assembled"
        );

        Ok(QuestionCard {
            question_id: question.question_id,
            question_text: question.question_text,
            field: question.field,
            correct_answer: question.correct_answer,
            other_correct_answers: distractors,
        })
    }

    /// Builds the card for a question chosen uniformly at random.
    ///
    /// # Errors
    /// [`CatalogError::Empty`] when there is nothing to choose from.
    pub async fn random_card(&self) -> Result<QuestionCard, CatalogError> {
        let ids = self.catalog.list_question_ids().await?;
        let picked = self
            .random
            .with_rng(|rng| pick_uniform(&ids, rng))
            .ok_or(CatalogError::Empty)?;
        self.card_by_id(picked).await
    }

    /// `card_by_id` when an id is given, `random_card` otherwise.
    pub async fn card(
        &self,
        question_id: Option<QuestionId>,
    ) -> Result<QuestionCard, CatalogError> {
        match question_id {
            Some(id) => self.card_by_id(id).await,
            None => self.random_card().await,
        }
    }
}
