use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::BankError;

static BANK_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/bank");

pub const DEFAULT_BANK: &str = "default";

/// Options are picked with the keys 1-9.
pub const MAX_OPTIONS: usize = 9;

pub type QuestionId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, strum_macros::Display)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum QuestionKind {
    #[strum(to_string = "Multiple Choice")]
    Mcq { options: Vec<String>, correct: usize },
    /// `min`/`max` are advisory only, shown to the user but never enforced.
    #[strum(to_string = "Fill in the Blank")]
    Integer {
        correct: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

impl Question {
    pub fn mcq(id: QuestionId, prompt: &str, options: &[&str], correct: usize) -> Self {
        Self {
            id,
            prompt: prompt.to_string(),
            kind: QuestionKind::Mcq {
                options: options.iter().map(|o| o.to_string()).collect(),
                correct,
            },
        }
    }

    pub fn integer(id: QuestionId, prompt: &str, correct: i64) -> Self {
        Self {
            id,
            prompt: prompt.to_string(),
            kind: QuestionKind::Integer {
                correct,
                min: None,
                max: None,
            },
        }
    }

    pub fn with_bounds(mut self, lo: i64, hi: i64) -> Self {
        if let QuestionKind::Integer { min, max, .. } = &mut self.kind {
            *min = Some(lo);
            *max = Some(hi);
        }
        self
    }

    /// The value an answer must equal to score: option index or integer.
    pub fn correct_value(&self) -> i64 {
        match self.kind {
            QuestionKind::Mcq { correct, .. } => correct as i64,
            QuestionKind::Integer { correct, .. } => correct,
        }
    }

    pub fn is_correct(&self, answer: i64) -> bool {
        answer == self.correct_value()
    }

    pub fn options(&self) -> &[String] {
        match &self.kind {
            QuestionKind::Mcq { options, .. } => options,
            QuestionKind::Integer { .. } => &[],
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self.kind, QuestionKind::Integer { .. })
    }

    /// Human readable form of an answer value for this question.
    pub fn describe_answer(&self, answer: i64) -> String {
        match &self.kind {
            QuestionKind::Mcq { options, .. } => usize::try_from(answer)
                .ok()
                .and_then(|i| options.get(i))
                .cloned()
                .unwrap_or_else(|| format!("option {}", answer)),
            QuestionKind::Integer { .. } => answer.to_string(),
        }
    }

    fn validate(&self) -> Result<(), BankError> {
        match &self.kind {
            QuestionKind::Mcq { options, correct } => {
                if options.is_empty() {
                    return Err(BankError::NoOptions(self.id));
                }
                if options.len() > MAX_OPTIONS {
                    return Err(BankError::TooManyOptions(self.id));
                }
                if *correct >= options.len() {
                    return Err(BankError::CorrectOutOfRange(self.id));
                }
            }
            QuestionKind::Integer {
                min: Some(lo),
                max: Some(hi),
                ..
            } if lo > hi => return Err(BankError::InvalidBounds(self.id)),
            QuestionKind::Integer { .. } => {}
        }
        Ok(())
    }
}

/// Ordered, read-only set of questions. Order is presentation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionBank {
    pub name: String,
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(name: impl Into<String>, questions: Vec<Question>) -> Result<Self, BankError> {
        let bank = Self {
            name: name.into(),
            questions,
        };
        bank.validate()?;
        Ok(bank)
    }

    /// Load one of the banks compiled into the binary, by file stem.
    pub fn embedded(name: &str) -> Result<Self, BankError> {
        let file = BANK_DIR
            .get_file(format!("{}.json", name))
            .ok_or_else(|| BankError::MissingEmbedded(name.to_string()))?;
        let contents = file
            .contents_utf8()
            .ok_or_else(|| BankError::MissingEmbedded(name.to_string()))?;
        Self::from_json(contents)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BankError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, BankError> {
        let bank: QuestionBank = serde_json::from_str(json)?;
        bank.validate()?;
        Ok(bank)
    }

    fn validate(&self) -> Result<(), BankError> {
        if self.questions.is_empty() {
            return Err(BankError::Empty);
        }
        let mut seen = HashSet::new();
        for q in &self.questions {
            if !seen.insert(q.id) {
                return Err(BankError::DuplicateId(q.id));
            }
            q.validate()?;
        }
        Ok(())
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn by_id(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}
