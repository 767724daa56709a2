use chrono::Local;
use log::{debug, info};
use std::time::Duration;

use crate::attempt::{Attempt, QuestionStatus};
use crate::countdown::Countdown;
use crate::error::DraftError;
use crate::question::{Question, QuestionBank, QuestionId};
use crate::result::QuizResult;

pub const DEFAULT_SECONDS_PER_QUESTION: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    NotStarted,
    InProgress,
    Completed,
}

/// Observable effect of a controller operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Rejected or not applicable; state untouched.
    Ignored,
    /// State changed, same question.
    Updated,
    /// The active question changed.
    Moved,
    /// The attempt was scored and a result emitted.
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
    Unanswered,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionReport<'a> {
    pub question: &'a Question,
    pub answer: Option<i64>,
    pub status: QuestionStatus,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub answered: usize,
    pub skipped: usize,
    pub timed_out: usize,
}

/// Accepts "", or an optional leading minus followed by one or more digits.
pub fn validate_draft(text: &str) -> Result<(), DraftError> {
    if text.is_empty() {
        return Ok(());
    }
    let digits = text.strip_prefix('-').unwrap_or(text);
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(DraftError::InvalidDraftInput(text.to_string()))
    }
}

/// Controller for one quiz attempt over a fixed question bank.
#[derive(Debug, Clone)]
pub struct Quiz {
    bank: QuestionBank,
    seconds_per_question: u32,
    phase: Phase,
    attempt: Attempt,
    countdown: Countdown,
    result: Option<QuizResult>,
}

impl Quiz {
    pub fn new(bank: QuestionBank, seconds_per_question: u32) -> Self {
        Self {
            bank,
            seconds_per_question: seconds_per_question.max(1),
            phase: Phase::NotStarted,
            attempt: Attempt::default(),
            countdown: Countdown::default(),
            result: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn attempt(&self) -> &Attempt {
        &self.attempt
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn seconds_per_question(&self) -> u32 {
        self.seconds_per_question
    }

    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    pub fn current_index(&self) -> usize {
        self.attempt.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.bank.get(self.attempt.current_index)
    }

    pub fn is_last_question(&self) -> bool {
        self.attempt.current_index + 1 == self.bank.len()
    }

    fn active_id(&self) -> Option<QuestionId> {
        self.current_question().map(|q| q.id)
    }

    pub fn status(&self, id: QuestionId) -> QuestionStatus {
        self.attempt.status(id)
    }

    pub fn remaining_seconds(&self, id: QuestionId) -> Option<u32> {
        self.attempt.remaining_seconds.get(&id).copied()
    }

    pub fn integer_draft(&self) -> &str {
        &self.attempt.integer_draft
    }

    pub fn counts(&self) -> Counts {
        Counts {
            answered: self.attempt.answers.len(),
            skipped: self.attempt.skipped.len(),
            timed_out: self.attempt.timed_out.len(),
        }
    }

    fn all_resolved(&self) -> bool {
        self.bank
            .questions()
            .iter()
            .all(|q| self.attempt.status(q.id).is_resolved())
    }

    /// The caller must only offer "next" when this holds.
    pub fn can_advance(&self) -> bool {
        self.phase == Phase::InProgress
            && !self.is_last_question()
            && self
                .active_id()
                .is_some_and(|id| self.attempt.status(id).is_resolved())
    }

    pub fn can_submit(&self) -> bool {
        self.phase == Phase::InProgress && self.all_resolved()
    }

    pub fn start(&mut self) -> Transition {
        if self.phase != Phase::NotStarted {
            return Transition::Ignored;
        }
        self.attempt = Attempt::default();
        for q in self.bank.questions() {
            self.attempt
                .remaining_seconds
                .insert(q.id, self.seconds_per_question);
        }
        self.phase = Phase::InProgress;
        self.on_question_changed();
        info!(
            "quiz started: bank={} questions={} seconds={}",
            self.bank.name,
            self.bank.len(),
            self.seconds_per_question
        );
        Transition::Updated
    }

    /// Runs on every index change: the draft belongs to the old question and
    /// the countdown is re-armed for the new one, only if it is still open.
    fn on_question_changed(&mut self) {
        self.attempt.integer_draft.clear();
        match self.active_id() {
            Some(id) if self.phase == Phase::InProgress && self.attempt.status(id).is_open() => {
                self.countdown.arm(id)
            }
            _ => self.countdown.cancel(),
        }
    }

    /// Feed elapsed wall time, ticking once per whole second fired.
    pub fn advance(&mut self, elapsed: Duration) -> Transition {
        let fired = self.countdown.advance(elapsed);
        let mut outcome = Transition::Ignored;
        for _ in 0..fired {
            outcome = self.tick();
            if outcome != Transition::Updated {
                break;
            }
        }
        outcome
    }

    /// One elapsed second on the active question.
    pub fn tick(&mut self) -> Transition {
        if self.phase != Phase::InProgress {
            return Transition::Ignored;
        }
        let Some(id) = self.active_id() else {
            return Transition::Ignored;
        };
        if !self.attempt.status(id).is_open() {
            return Transition::Ignored;
        }

        let remaining = self
            .attempt
            .remaining_seconds
            .entry(id)
            .or_insert(self.seconds_per_question);
        *remaining = remaining.saturating_sub(1);
        if *remaining > 0 {
            return Transition::Updated;
        }

        // Out of time. A multiple-choice pick made in time is kept and locked;
        // otherwise the question is recorded as timed out.
        if self.attempt.answers.contains_key(&id) {
            self.attempt.locked.insert(id);
        } else {
            self.attempt.timed_out.insert(id);
        }
        self.countdown.cancel();
        info!("question {} timed out", id);
        self.advance_or_submit()
    }

    pub fn record_mcq_answer(&mut self, id: QuestionId, option_index: usize) -> Transition {
        if self.phase != Phase::InProgress {
            return Transition::Ignored;
        }
        let Some(question) = self.bank.by_id(id) else {
            return Transition::Ignored;
        };
        if question.is_integer() || option_index >= question.options().len() {
            return Transition::Ignored;
        }
        if !self.attempt.accepts_answer(id) {
            debug!("answer for question {} rejected: not open", id);
            return Transition::Ignored;
        }
        // Overwrites freely until the question locks.
        self.attempt.answers.insert(id, option_index as i64);
        Transition::Updated
    }

    pub fn set_integer_draft(&mut self, text: &str) -> Transition {
        if self.phase != Phase::InProgress {
            return Transition::Ignored;
        }
        let editable = self
            .current_question()
            .is_some_and(|q| q.is_integer() && self.attempt.accepts_answer(q.id));
        if !editable {
            return Transition::Ignored;
        }
        if let Err(e) = validate_draft(text) {
            debug!("draft rejected: {}", e);
            return Transition::Ignored;
        }
        self.attempt.integer_draft = text.to_string();
        Transition::Updated
    }

    /// One-shot: unlike multiple-choice, a committed integer can't be edited.
    /// Design choice, not a bug; whether integers should stay editable until
    /// lock-in is an open question.
    pub fn commit_integer_answer(&mut self, id: QuestionId) -> Transition {
        if self.phase != Phase::InProgress || self.attempt.integer_draft.is_empty() {
            return Transition::Ignored;
        }
        let Some(question) = self.current_question() else {
            return Transition::Ignored;
        };
        if question.id != id || !question.is_integer() || !self.attempt.accepts_answer(id) {
            return Transition::Ignored;
        }
        let Ok(value) = self.attempt.integer_draft.parse::<i64>() else {
            debug!("draft {:?} does not fit an i64", self.attempt.integer_draft);
            return Transition::Ignored;
        };

        self.attempt.answers.insert(id, value);
        self.attempt.locked.insert(id);
        self.attempt.integer_draft.clear();
        self.countdown.cancel();
        Transition::Updated
    }

    pub fn next(&mut self) -> Transition {
        if self.phase != Phase::InProgress || self.is_last_question() {
            return Transition::Ignored;
        }
        self.attempt.current_index += 1;
        self.on_question_changed();
        Transition::Moved
    }

    pub fn previous(&mut self) -> Transition {
        if self.phase != Phase::InProgress || self.attempt.current_index == 0 {
            return Transition::Ignored;
        }
        self.attempt.current_index -= 1;
        self.on_question_changed();
        Transition::Moved
    }

    pub fn skip(&mut self, id: QuestionId) -> Transition {
        if self.phase != Phase::InProgress || self.active_id() != Some(id) {
            return Transition::Ignored;
        }
        if self.attempt.status(id) != QuestionStatus::Open {
            return Transition::Ignored;
        }
        // remaining_seconds already holds the live value, which is the snapshot.
        self.attempt.skipped.insert(id);
        self.countdown.cancel();
        info!("question {} skipped", id);
        self.advance_or_submit()
    }

    fn advance_or_submit(&mut self) -> Transition {
        if !self.is_last_question() {
            self.attempt.current_index += 1;
            self.on_question_changed();
            Transition::Moved
        } else if self.all_resolved() {
            self.complete()
        } else {
            Transition::Updated
        }
    }

    pub fn submit(&mut self) -> Transition {
        if !self.can_submit() {
            return Transition::Ignored;
        }
        self.complete()
    }

    pub fn score(&self) -> u32 {
        self.bank
            .questions()
            .iter()
            .filter(|q| {
                self.attempt
                    .answers
                    .get(&q.id)
                    .is_some_and(|answer| q.is_correct(*answer))
            })
            .count() as u32
    }

    fn complete(&mut self) -> Transition {
        let result = QuizResult {
            date: Local::now(),
            score: self.score(),
            total_questions: self.bank.len() as u32,
            answers: self.attempt.answers.clone(),
        };
        info!(
            "quiz completed: score {}/{}",
            result.score, result.total_questions
        );
        self.result = Some(result);
        self.phase = Phase::Completed;
        self.countdown.cancel();
        Transition::Completed
    }

    pub fn breakdown(&self) -> Vec<QuestionReport<'_>> {
        self.bank
            .questions()
            .iter()
            .map(|question| {
                let answer = self.attempt.answers.get(&question.id).copied();
                let verdict = match answer {
                    None => Verdict::Unanswered,
                    Some(a) if question.is_correct(a) => Verdict::Correct,
                    Some(_) => Verdict::Incorrect,
                };
                QuestionReport {
                    question,
                    answer,
                    status: self.attempt.status(question.id),
                    verdict,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> QuestionBank {
        QuestionBank::new(
            "test",
            vec![
                Question::mcq(1, "first", &["A", "B"], 0),
                Question::integer(2, "second", 5).with_bounds(0, 10),
                Question::mcq(3, "third", &["X", "Y"], 1),
            ],
        )
        .unwrap()
    }

    fn started(seconds: u32) -> Quiz {
        let mut quiz = Quiz::new(bank(), seconds);
        assert_eq!(quiz.start(), Transition::Updated);
        quiz
    }

    #[test]
    fn test_validate_draft() {
        assert!(validate_draft("").is_ok());
        assert!(validate_draft("0").is_ok());
        assert!(validate_draft("-42").is_ok());
        assert!(validate_draft("-").is_err());
        assert!(validate_draft("4a").is_err());
        assert!(validate_draft("--1").is_err());
        assert!(validate_draft("1.5").is_err());
        assert!(validate_draft(" 1").is_err());
    }

    #[test]
    fn test_start_initializes_timers() {
        let quiz = started(30);
        assert_eq!(quiz.phase(), Phase::InProgress);
        assert_eq!(quiz.current_index(), 0);
        for id in [1, 2, 3] {
            assert_eq!(quiz.remaining_seconds(id), Some(30));
        }
        assert_eq!(quiz.countdown().armed_for(), Some(1));
    }

    #[test]
    fn test_start_twice_is_ignored() {
        let mut quiz = started(30);
        quiz.tick();
        assert_eq!(quiz.start(), Transition::Ignored);
        assert_eq!(quiz.remaining_seconds(1), Some(29));
    }

    #[test]
    fn test_operations_before_start_are_ignored() {
        let mut quiz = Quiz::new(bank(), 30);
        assert_eq!(quiz.tick(), Transition::Ignored);
        assert_eq!(quiz.record_mcq_answer(1, 0), Transition::Ignored);
        assert_eq!(quiz.next(), Transition::Ignored);
        assert_eq!(quiz.submit(), Transition::Ignored);
    }

    #[test]
    fn test_zero_seconds_clamped() {
        let quiz = Quiz::new(bank(), 0);
        assert_eq!(quiz.seconds_per_question(), 1);
    }

    #[test]
    fn test_tick_decrements_active_only() {
        let mut quiz = started(30);
        assert_eq!(quiz.tick(), Transition::Updated);
        assert_eq!(quiz.remaining_seconds(1), Some(29));
        assert_eq!(quiz.remaining_seconds(2), Some(30));
    }

    #[test]
    fn test_timeout_marks_and_advances() {
        let mut quiz = started(2);
        assert_eq!(quiz.tick(), Transition::Updated);
        assert_eq!(quiz.tick(), Transition::Moved);
        assert!(quiz.attempt().timed_out.contains(&1));
        assert_eq!(quiz.remaining_seconds(1), Some(0));
        assert_eq!(quiz.current_index(), 1);
        assert_eq!(quiz.countdown().armed_for(), Some(2));
    }

    #[test]
    fn test_timeout_keeps_mcq_answer_locked() {
        let mut quiz = started(1);
        quiz.record_mcq_answer(1, 1);
        assert_eq!(quiz.tick(), Transition::Moved);
        assert!(!quiz.attempt().timed_out.contains(&1));
        assert_eq!(quiz.status(1), QuestionStatus::Locked);
        assert_eq!(quiz.attempt().answers.get(&1), Some(&1));
        assert_eq!(quiz.record_mcq_answer(1, 0), Transition::Ignored);
    }

    #[test]
    fn test_mcq_overwrites_while_open() {
        let mut quiz = started(30);
        assert_eq!(quiz.record_mcq_answer(1, 1), Transition::Updated);
        assert_eq!(quiz.record_mcq_answer(1, 0), Transition::Updated);
        assert_eq!(quiz.attempt().answers.get(&1), Some(&0));
        assert_eq!(quiz.status(1), QuestionStatus::Answered);
        // timer keeps running on an answered multiple-choice question
        assert_eq!(quiz.countdown().armed_for(), Some(1));
    }

    #[test]
    fn test_mcq_rejects_bad_targets() {
        let mut quiz = started(30);
        assert_eq!(quiz.record_mcq_answer(1, 2), Transition::Ignored);
        assert_eq!(quiz.record_mcq_answer(2, 0), Transition::Ignored);
        assert_eq!(quiz.record_mcq_answer(99, 0), Transition::Ignored);
        assert!(quiz.attempt().answers.is_empty());
    }

    #[test]
    fn test_integer_draft_and_commit() {
        let mut quiz = started(30);
        quiz.record_mcq_answer(1, 0);
        quiz.next();

        assert_eq!(quiz.set_integer_draft("-"), Transition::Ignored);
        assert_eq!(quiz.set_integer_draft("12"), Transition::Updated);
        assert_eq!(quiz.set_integer_draft("12x"), Transition::Ignored);
        assert_eq!(quiz.integer_draft(), "12");

        assert_eq!(quiz.commit_integer_answer(2), Transition::Updated);
        assert_eq!(quiz.attempt().answers.get(&2), Some(&12));
        assert_eq!(quiz.status(2), QuestionStatus::Locked);
        assert!(!quiz.countdown().is_armed());

        // one-shot: further edits are refused
        assert_eq!(quiz.set_integer_draft("5"), Transition::Ignored);
        assert_eq!(quiz.commit_integer_answer(2), Transition::Ignored);
        assert_eq!(quiz.attempt().answers.get(&2), Some(&12));
    }

    #[test]
    fn test_commit_requires_draft() {
        let mut quiz = started(30);
        quiz.record_mcq_answer(1, 0);
        quiz.next();
        assert_eq!(quiz.commit_integer_answer(2), Transition::Ignored);
        assert!(!quiz.attempt().answers.contains_key(&2));
    }

    #[test]
    fn test_commit_ignores_overflow() {
        let mut quiz = started(30);
        quiz.next();
        assert_eq!(
            quiz.set_integer_draft("99999999999999999999999"),
            Transition::Updated
        );
        assert_eq!(quiz.commit_integer_answer(2), Transition::Ignored);
        assert!(quiz.status(2).is_open());
    }

    #[test]
    fn test_out_of_range_integer_is_accepted_and_scored() {
        let bank = QuestionBank::new(
            "t",
            vec![Question::integer(1, "big", 500).with_bounds(0, 10)],
        )
        .unwrap();
        let mut quiz = Quiz::new(bank, 30);
        quiz.start();
        quiz.set_integer_draft("500");
        quiz.commit_integer_answer(1);
        assert_eq!(quiz.submit(), Transition::Completed);
        assert_eq!(quiz.result().unwrap().score, 1);
    }

    #[test]
    fn test_draft_cleared_on_navigation() {
        let mut quiz = started(30);
        quiz.next();
        quiz.set_integer_draft("3");
        quiz.previous();
        quiz.next();
        assert_eq!(quiz.integer_draft(), "");
    }

    #[test]
    fn test_previous_preserves_countdown() {
        let mut quiz = started(30);
        quiz.record_mcq_answer(1, 0);
        for _ in 0..4 {
            quiz.tick();
        }
        quiz.next();
        quiz.tick();
        assert_eq!(quiz.previous(), Transition::Moved);
        assert_eq!(quiz.remaining_seconds(1), Some(26));
        assert_eq!(quiz.remaining_seconds(2), Some(29));
        assert_eq!(quiz.countdown().armed_for(), Some(1));
    }

    #[test]
    fn test_previous_does_not_reopen_skipped() {
        let mut quiz = started(30);
        quiz.tick();
        assert_eq!(quiz.skip(1), Transition::Moved);
        quiz.previous();
        assert_eq!(quiz.status(1), QuestionStatus::Skipped);
        assert!(!quiz.countdown().is_armed());
        assert_eq!(quiz.tick(), Transition::Ignored);
        assert_eq!(quiz.remaining_seconds(1), Some(29));
        assert_eq!(quiz.record_mcq_answer(1, 0), Transition::Ignored);
    }

    #[test]
    fn test_previous_at_start_ignored() {
        let mut quiz = started(30);
        assert_eq!(quiz.previous(), Transition::Ignored);
    }

    #[test]
    fn test_skip_is_idempotent() {
        let mut quiz = started(30);
        assert_eq!(quiz.skip(1), Transition::Moved);
        assert_eq!(quiz.skip(1), Transition::Ignored);
        assert_eq!(quiz.current_index(), 1);
        assert_eq!(quiz.attempt().skipped.len(), 1);
    }

    #[test]
    fn test_skip_refused_for_answered() {
        let mut quiz = started(30);
        quiz.record_mcq_answer(1, 0);
        assert_eq!(quiz.skip(1), Transition::Ignored);
        assert!(quiz.attempt().skipped.is_empty());
    }

    #[test]
    fn test_skip_last_waits_for_unresolved() {
        let mut quiz = started(30);
        quiz.next();
        quiz.next();
        assert_eq!(quiz.skip(3), Transition::Updated);
        assert_eq!(quiz.phase(), Phase::InProgress);
        assert!(!quiz.can_submit());
    }

    #[test]
    fn test_timeout_on_last_waits_for_unresolved() {
        let mut quiz = started(3);
        quiz.next();
        quiz.next();
        assert_eq!(quiz.advance(Duration::from_secs(3)), Transition::Updated);
        assert_eq!(quiz.status(3), QuestionStatus::TimedOut);
        assert_eq!(quiz.phase(), Phase::InProgress);
        assert!(!quiz.countdown().is_armed());
        assert!(!quiz.can_submit());
    }

    #[test]
    fn test_next_guard_is_advisory() {
        let mut quiz = started(30);
        assert!(!quiz.can_advance());
        assert_eq!(quiz.next(), Transition::Moved);
        quiz.next();
        assert_eq!(quiz.next(), Transition::Ignored);
    }

    #[test]
    fn test_submit_requires_all_resolved() {
        let mut quiz = started(30);
        quiz.record_mcq_answer(1, 0);
        assert_eq!(quiz.submit(), Transition::Ignored);
        quiz.next();
        quiz.skip(2);
        quiz.record_mcq_answer(3, 0);
        assert!(quiz.can_submit());
        assert_eq!(quiz.submit(), Transition::Completed);
        assert_eq!(quiz.submit(), Transition::Ignored);
        assert!(!quiz.countdown().is_armed());
    }

    #[test]
    fn test_completed_is_frozen() {
        let mut quiz = started(30);
        quiz.skip(1);
        quiz.skip(2);
        assert_eq!(quiz.skip(3), Transition::Completed);
        assert_eq!(quiz.record_mcq_answer(3, 1), Transition::Ignored);
        assert_eq!(quiz.previous(), Transition::Ignored);
        assert_eq!(quiz.tick(), Transition::Ignored);
        assert_eq!(quiz.result().unwrap().score, 0);
    }

    #[test]
    fn test_advance_ticks_per_whole_second() {
        let mut quiz = started(30);
        assert_eq!(quiz.advance(Duration::from_millis(400)), Transition::Ignored);
        assert_eq!(quiz.advance(Duration::from_millis(700)), Transition::Updated);
        assert_eq!(quiz.remaining_seconds(1), Some(29));
        assert_eq!(quiz.advance(Duration::from_secs(3)), Transition::Updated);
        assert_eq!(quiz.remaining_seconds(1), Some(26));
    }

    #[test]
    fn test_advance_stops_at_question_change() {
        let mut quiz = started(2);
        assert_eq!(quiz.advance(Duration::from_secs(10)), Transition::Moved);
        assert_eq!(quiz.remaining_seconds(2), Some(2));
    }

    #[test]
    fn test_breakdown_verdicts() {
        let mut quiz = started(30);
        quiz.record_mcq_answer(1, 1);
        quiz.next();
        quiz.skip(2);
        quiz.record_mcq_answer(3, 1);
        quiz.submit();

        let report = quiz.breakdown();
        assert_eq!(report[0].verdict, Verdict::Incorrect);
        assert_eq!(report[1].verdict, Verdict::Unanswered);
        assert_eq!(report[1].status, QuestionStatus::Skipped);
        assert_eq!(report[2].verdict, Verdict::Correct);
        assert_eq!(
            quiz.counts(),
            Counts {
                answered: 2,
                skipped: 1,
                timed_out: 0
            }
        );
    }
}
