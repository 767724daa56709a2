use itertools::Itertools;
use log::info;

use crate::error::StoreError;
use crate::result::QuizResult;
use crate::time_series::TrendPoint;
use crate::util::{mean, std_dev};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum ScoreBand {
    Low,
    Medium,
    High,
}

/// < 30 % low, < 60 % medium, otherwise high.
pub fn score_band(result: &QuizResult) -> ScoreBand {
    let pct = result.percentage();
    if pct < 30.0 {
        ScoreBand::Low
    } else if pct < 60.0 {
        ScoreBand::Medium
    } else {
        ScoreBand::High
    }
}

/// The store gives no ordering; display is always newest first.
pub fn newest_first(results: Vec<QuizResult>) -> Vec<QuizResult> {
    results
        .into_iter()
        .sorted_by(|a, b| b.date.cmp(&a.date))
        .collect()
}

/// Trend series, oldest attempt first, from a newest-first list.
pub fn trend(results: &[QuizResult]) -> Vec<TrendPoint> {
    results
        .iter()
        .rev()
        .enumerate()
        .map(|(i, r)| TrendPoint::new((i + 1) as f64, r.percentage()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub attempts: usize,
    pub mean_percent: f64,
    pub best_percent: f64,
    pub std_dev: f64,
}

pub fn summarize(results: &[QuizResult]) -> Option<Summary> {
    let percents: Vec<f64> = results.iter().map(QuizResult::percentage).collect();
    Some(Summary {
        attempts: percents.len(),
        mean_percent: mean(&percents)?,
        best_percent: percents.iter().copied().fold(0.0, f64::max),
        std_dev: std_dev(&percents)?,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryState {
    Loading,
    Loaded(Vec<QuizResult>),
    Failed(String),
}

/// State behind the history screen.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryView {
    pub state: HistoryState,
    pub scroll_offset: usize,
    pub confirm_reset: bool,
}

impl Default for HistoryView {
    fn default() -> Self {
        Self {
            state: HistoryState::Loading,
            scroll_offset: 0,
            confirm_reset: false,
        }
    }
}

impl HistoryView {
    pub fn begin_loading(&mut self) {
        *self = Self::default();
    }

    pub fn on_loaded(&mut self, outcome: Result<Vec<QuizResult>, StoreError>) {
        self.scroll_offset = 0;
        self.state = match outcome {
            Ok(results) => {
                info!("loaded {} quiz results", results.len());
                HistoryState::Loaded(newest_first(results))
            }
            Err(e) => HistoryState::Failed(e.to_string()),
        };
    }

    /// Returns true when the history should be reloaded.
    pub fn on_reset(&mut self, outcome: Result<(), StoreError>) -> bool {
        self.confirm_reset = false;
        match outcome {
            Ok(()) => {
                self.begin_loading();
                true
            }
            Err(e) => {
                self.state = HistoryState::Failed(e.to_string());
                false
            }
        }
    }

    /// Reset is a recovery action, offered only when loading failed, and it
    /// takes two presses. Returns true when the reset should go ahead.
    pub fn request_reset(&mut self) -> bool {
        if !matches!(self.state, HistoryState::Failed(_)) {
            return false;
        }
        if self.confirm_reset {
            self.confirm_reset = false;
            self.state = HistoryState::Loading;
            true
        } else {
            self.confirm_reset = true;
            false
        }
    }

    pub fn cancel_reset(&mut self) {
        self.confirm_reset = false;
    }

    pub fn results(&self) -> &[QuizResult] {
        match &self.state {
            HistoryState::Loaded(results) => results,
            _ => &[],
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        if self.scroll_offset + 1 < self.results().len() {
            self.scroll_offset += 1;
        }
    }
}
