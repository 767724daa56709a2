use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::question::QuestionId;

/// Durable record of one completed attempt. Created once, at submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    pub date: DateTime<Local>,
    pub score: u32,
    pub total_questions: u32,
    pub answers: BTreeMap<QuestionId, i64>,
}

impl QuizResult {
    pub fn percentage(&self) -> f64 {
        crate::util::percentage(self.score, self.total_questions)
    }

    pub fn is_perfect(&self) -> bool {
        self.total_questions > 0 && self.score == self.total_questions
    }
}
