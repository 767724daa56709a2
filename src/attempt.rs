use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::question::QuestionId;

/// Where a single question stands within an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum QuestionStatus {
    /// Countdown may run; an answer can still be recorded or changed.
    Open,
    /// Multiple-choice answer recorded but still changeable.
    Answered,
    /// Answer recorded and final.
    Locked,
    #[strum(to_string = "Time expired")]
    TimedOut,
    Skipped,
}

impl QuestionStatus {
    pub fn is_open(self) -> bool {
        matches!(self, QuestionStatus::Open | QuestionStatus::Answered)
    }

    /// Counts towards "every question handled" for submission.
    pub fn is_resolved(self) -> bool {
        !matches!(self, QuestionStatus::Open)
    }
}

/// Per-run mutable state, owned by the quiz controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub current_index: usize,
    pub answers: BTreeMap<QuestionId, i64>,
    pub timed_out: BTreeSet<QuestionId>,
    pub skipped: BTreeSet<QuestionId>,
    /// Answers that can no longer change: committed integers and
    /// multiple-choice answers whose countdown ran out.
    pub locked: BTreeSet<QuestionId>,
    pub remaining_seconds: BTreeMap<QuestionId, u32>,
    /// Uncommitted integer input for the active question.
    pub integer_draft: String,
}

impl Default for Attempt {
    fn default() -> Self {
        Self {
            current_index: 0,
            answers: BTreeMap::new(),
            timed_out: BTreeSet::new(),
            skipped: BTreeSet::new(),
            locked: BTreeSet::new(),
            remaining_seconds: BTreeMap::new(),
            integer_draft: String::new(),
        }
    }
}

impl Attempt {
    pub fn status(&self, id: QuestionId) -> QuestionStatus {
        if self.timed_out.contains(&id) {
            QuestionStatus::TimedOut
        } else if self.skipped.contains(&id) {
            QuestionStatus::Skipped
        } else if self.locked.contains(&id) {
            QuestionStatus::Locked
        } else if self.answers.contains_key(&id) {
            QuestionStatus::Answered
        } else {
            QuestionStatus::Open
        }
    }

    /// Whether a new answer may be written for `id`.
    pub fn accepts_answer(&self, id: QuestionId) -> bool {
        !self.timed_out.contains(&id) && !self.skipped.contains(&id) && !self.locked.contains(&id)
    }
}
