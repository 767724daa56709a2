use std::time::Duration;

use crate::question::QuestionId;

/// The one per-question countdown task.
///
/// At most one question is armed at a time. Arming always replaces (cancels)
/// the previous task and discards any partial second it had accumulated, so
/// ticks can never overlap or double up across question changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Countdown {
    armed: Option<QuestionId>,
    carry: Duration,
}

impl Countdown {
    pub fn arm(&mut self, id: QuestionId) {
        self.armed = Some(id);
        self.carry = Duration::ZERO;
    }

    pub fn cancel(&mut self) {
        self.armed = None;
        self.carry = Duration::ZERO;
    }

    pub fn armed_for(&self) -> Option<QuestionId> {
        self.armed
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Feed elapsed wall time; returns how many whole seconds fired.
    pub fn advance(&mut self, elapsed: Duration) -> u64 {
        if self.armed.is_none() {
            return 0;
        }
        self.carry += elapsed;
        let fired = self.carry.as_secs();
        self.carry -= Duration::from_secs(fired);
        fired
    }
}
