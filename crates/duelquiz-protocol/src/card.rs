//! Question cards: what a client renders for one trivia question.

use serde::{Deserialize, Serialize};

use crate::{FieldId, OptionId, QuestionId};

/// The topical grouping of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub field_id: FieldId,
    pub field_text: String,
}

/// One answer option. A question's own option is its correct answer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnswerOption {
    pub option_id: OptionId,
    pub option_text: String,
}

/// A question together with its correct answer and up to three
/// distractors drawn from other questions of the same field.
///
/// Distractors are the *correct* answers of sibling questions, so they
/// are plausible in context. They are sampled fresh on every request;
/// two cards for the same question usually differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCard {
    pub question_id: QuestionId,
    pub question_text: String,
    pub field: Field,
    pub correct_answer: AnswerOption,
    pub other_correct_answers: Vec<AnswerOption>,
}
