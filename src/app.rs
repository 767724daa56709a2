use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{error, info};
use std::time::Duration;

use crate::history::HistoryView;
use crate::question::QuestionBank;
use crate::quiz::{Quiz, Transition};
use crate::store::{StoreError, StoreEvent, StoreHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Welcome,
    Quiz,
    Results,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Outcome of the best-effort save of the finished attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Idle,
    Saving,
    Saved(i64),
    Failed(String),
}

#[derive(Debug)]
pub struct App {
    pub bank: QuestionBank,
    pub seconds_per_question: u32,
    pub quiz: Quiz,
    pub state: AppState,
    pub history: HistoryView,
    pub save_status: SaveStatus,
    history_return: AppState,
    store: Option<StoreHandle>,
}

impl App {
    pub fn new(bank: QuestionBank, seconds_per_question: u32, store: Option<StoreHandle>) -> Self {
        Self {
            quiz: Quiz::new(bank.clone(), seconds_per_question),
            bank,
            seconds_per_question,
            state: AppState::Welcome,
            history: HistoryView::default(),
            save_status: SaveStatus::Idle,
            history_return: AppState::Welcome,
            store,
        }
    }

    pub fn start_quiz(&mut self) {
        self.quiz = Quiz::new(self.bank.clone(), self.seconds_per_question);
        self.quiz.start();
        self.save_status = SaveStatus::Idle;
        self.state = AppState::Quiz;
    }

    pub fn open_history(&mut self) {
        if self.state != AppState::History {
            self.history_return = self.state;
        }
        self.state = AppState::History;
        self.history.begin_loading();
        self.request_load();
    }

    fn request_load(&mut self) {
        if !self.store.as_ref().is_some_and(|s| s.load()) {
            self.history.on_loaded(Err(not_running()));
        }
    }

    /// Stops the store worker after it has finished any pending save.
    pub fn shutdown(&mut self) {
        if let Some(store) = self.store.take() {
            store.shutdown();
        }
    }

    pub fn on_tick(&mut self, elapsed: Duration) {
        if self.state == AppState::Quiz {
            let t = self.quiz.advance(elapsed);
            self.after(t);
        }
    }

    fn after(&mut self, transition: Transition) {
        if transition == Transition::Completed {
            self.on_completed();
        }
    }

    fn on_completed(&mut self) {
        self.state = AppState::Results;
        let Some(result) = self.quiz.result().cloned() else {
            return;
        };
        // Saving never holds back the results screen.
        self.save_status = if self.store.as_ref().is_some_and(|s| s.append(result)) {
            SaveStatus::Saving
        } else {
            let e = not_running();
            error!("failed to save results: {}", e);
            SaveStatus::Failed(e.to_string())
        };
    }

    pub fn on_store_event(&mut self, event: StoreEvent) {
        match event {
            StoreEvent::Appended(Ok(id)) => self.save_status = SaveStatus::Saved(id),
            StoreEvent::Appended(Err(e)) => self.save_status = SaveStatus::Failed(e.to_string()),
            StoreEvent::Loaded(outcome) => self.history.on_loaded(outcome),
            StoreEvent::Reset(outcome) => {
                if self.history.on_reset(outcome) {
                    self.request_load();
                }
            }
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Control {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return Control::Quit;
        }

        match self.state {
            AppState::Welcome => match key.code {
                KeyCode::Enter => self.start_quiz(),
                KeyCode::Char('h') => self.open_history(),
                KeyCode::Char('q') => return Control::Quit,
                _ => {}
            },
            AppState::Quiz => {
                let t = self.on_quiz_key(key.code);
                self.after(t);
            }
            AppState::Results => match key.code {
                KeyCode::Enter | KeyCode::Char('n') => self.start_quiz(),
                KeyCode::Char('h') => self.open_history(),
                KeyCode::Char('q') => return Control::Quit,
                _ => {}
            },
            AppState::History => self.on_history_key(key.code),
        }
        Control::Continue
    }

    fn on_quiz_key(&mut self, code: KeyCode) -> Transition {
        let Some(question) = self.quiz.current_question() else {
            return Transition::Ignored;
        };
        let id = question.id;
        let is_integer = question.is_integer();

        match code {
            KeyCode::Left => self.quiz.previous(),
            KeyCode::Right if self.quiz.can_advance() => self.quiz.next(),
            KeyCode::Tab => self.quiz.skip(id),
            KeyCode::Enter => {
                if is_integer && !self.quiz.integer_draft().is_empty() {
                    self.quiz.commit_integer_answer(id)
                } else if self.quiz.is_last_question() {
                    self.quiz.submit()
                } else if self.quiz.can_advance() {
                    self.quiz.next()
                } else {
                    Transition::Ignored
                }
            }
            KeyCode::Backspace if is_integer => {
                let mut draft = self.quiz.integer_draft().to_string();
                draft.pop();
                self.quiz.set_integer_draft(&draft)
            }
            KeyCode::Char('-') if is_integer => {
                // a lone "-" is not a valid draft, so minus flips the sign instead
                let draft = self.quiz.integer_draft().to_string();
                match draft.strip_prefix('-') {
                    Some(rest) => self.quiz.set_integer_draft(rest),
                    None if draft.is_empty() => Transition::Ignored,
                    None => self.quiz.set_integer_draft(&format!("-{}", draft)),
                }
            }
            KeyCode::Char(c) if is_integer => {
                let draft = format!("{}{}", self.quiz.integer_draft(), c);
                self.quiz.set_integer_draft(&draft)
            }
            KeyCode::Char('s') => self.quiz.skip(id),
            KeyCode::Char(c) => match c.to_digit(10) {
                Some(n) if n >= 1 => self.quiz.record_mcq_answer(id, n as usize - 1),
                _ => Transition::Ignored,
            },
            _ => Transition::Ignored,
        }
    }

    fn on_history_key(&mut self, code: KeyCode) {
        if code != KeyCode::Char('x') {
            self.history.cancel_reset();
        }
        match code {
            KeyCode::Up => self.history.scroll_up(),
            KeyCode::Down => self.history.scroll_down(),
            KeyCode::Char('r') => self.open_history(),
            KeyCode::Char('x') => {
                if self.history.request_reset() {
                    info!("history reset requested");
                    if !self.store.as_ref().is_some_and(|s| s.reset()) {
                        self.history.on_reset(Err(not_running()));
                    }
                }
            }
            KeyCode::Char('n') => self.start_quiz(),
            KeyCode::Char('b') | KeyCode::Backspace => self.state = self.history_return,
            _ => {}
        }
    }
}

fn not_running() -> StoreError {
    StoreError::StoreUnavailable("result store is not running".into())
}
