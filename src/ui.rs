pub mod charting;
pub mod history;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, AppState, SaveStatus};
use crate::attempt::QuestionStatus;
use crate::question::{Question, QuestionKind};
use crate::quiz::{Quiz, Verdict};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
/// Countdown turns red at or below this many seconds.
const LOW_TIME_SECS: u32 = 10;

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Welcome => render_welcome(self, area, buf),
            AppState::Quiz => render_quiz(&self.quiz, area, buf),
            AppState::Results => render_results(self, area, buf),
            AppState::History => history::render_history(&self.history, area, buf),
        }
    }
}

fn render_welcome(app: &App, area: Rect, buf: &mut Buffer) {
    let text = vec![
        Line::from(Span::styled("QuizMaster", bold().fg(Color::Blue))),
        Line::from(""),
        Line::from(format!(
            "{} questions, multiple choice and fill in the blank. \
             You have {} seconds per question.",
            app.bank.len(),
            app.seconds_per_question
        )),
        Line::from("Remember: if you skip a question, you can't go back to it. Good luck!"),
        Line::from(""),
        Line::from(Span::styled("(enter) start / (h)istory / (esc)ape", italic())),
    ];

    let top = area.height.saturating_sub(text.len() as u16) / 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([Constraint::Length(top), Constraint::Min(1)])
        .split(area);

    Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);
}

fn status_span(status: QuestionStatus) -> Option<Span<'static>> {
    match status {
        QuestionStatus::TimedOut => {
            Some(Span::styled("Time expired", Style::default().fg(Color::Red)))
        }
        QuestionStatus::Skipped => {
            Some(Span::styled("Skipped", Style::default().fg(Color::Yellow)))
        }
        QuestionStatus::Locked => Some(Span::styled("Answer locked", dim())),
        QuestionStatus::Open | QuestionStatus::Answered => None,
    }
}

fn render_quiz(quiz: &Quiz, area: Rect, buf: &mut Buffer) {
    let Some(question) = quiz.current_question() else {
        return;
    };
    let status = quiz.status(question.id);
    let counts = quiz.counts();

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let prompt_lines =
        ((question.prompt.width() as f64 / max_chars_per_line as f64).ceil() as u16).max(1);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),            // progress + timer
            Constraint::Length(1),            // padding
            Constraint::Length(prompt_lines), // prompt
            Constraint::Length(1),            // kind / status
            Constraint::Length(1),            // padding
            Constraint::Min(1),               // answer area
            Constraint::Length(1),            // legend
        ])
        .split(area);

    let remaining = quiz.remaining_seconds(question.id).unwrap_or(0);
    let timer_style = if remaining <= LOW_TIME_SECS {
        bold().fg(Color::Red)
    } else {
        dim()
    };
    let header = Line::from(vec![
        Span::styled(
            format!("Question {} of {}", quiz.current_index() + 1, quiz.bank().len()),
            dim(),
        ),
        Span::raw("   "),
        Span::raw(format!("Answered: {}  ", counts.answered)),
        Span::styled(format!("Skipped: {}", counts.skipped), Style::default().fg(Color::Yellow)),
        Span::raw("   "),
        Span::styled(format!("{}s", remaining), timer_style),
    ]);
    Paragraph::new(header)
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    Paragraph::new(Span::styled(question.prompt.as_str(), bold()))
        .wrap(Wrap { trim: true })
        .render(chunks[2], buf);

    let mut kind_line = vec![Span::styled(question.kind.to_string(), italic())];
    if let Some(span) = status_span(status) {
        kind_line.push(Span::raw("   "));
        kind_line.push(span);
    }
    Paragraph::new(Line::from(kind_line)).render(chunks[3], buf);

    let answer = quiz.attempt().answers.get(&question.id).copied();
    let body = match &question.kind {
        QuestionKind::Mcq { options, .. } => options
            .iter()
            .enumerate()
            .map(|(i, option)| {
                let chosen = answer == Some(i as i64);
                let style = if chosen {
                    bold().fg(Color::Blue)
                } else if !status.is_open() {
                    dim()
                } else {
                    Style::default()
                };
                let marker = if chosen { ">" } else { " " };
                Line::from(Span::styled(format!("{} {}) {}", marker, i + 1, option), style))
            })
            .collect::<Vec<Line>>(),
        QuestionKind::Integer { min, max, .. } => {
            let mut lines = vec![match answer {
                Some(value) => Line::from(vec![
                    Span::raw("Your answer: "),
                    Span::styled(value.to_string(), bold().fg(Color::Blue)),
                ]),
                None if status.is_open() => Line::from(vec![
                    Span::raw("Your answer: "),
                    Span::styled(
                        format!("{}_", quiz.integer_draft()),
                        Style::default().add_modifier(Modifier::UNDERLINED),
                    ),
                ]),
                None => Line::from(Span::styled("Your answer: -", dim())),
            }];
            if let (Some(lo), Some(hi)) = (min, max) {
                lines.push(Line::from(Span::styled(
                    format!("Valid range: {} to {}", lo, hi),
                    dim(),
                )));
            }
            lines
        }
    };
    Paragraph::new(body)
        .wrap(Wrap { trim: false })
        .render(chunks[5], buf);

    let finish = if quiz.is_last_question() {
        "(enter) submit"
    } else {
        "(→) next"
    };
    let legend = if question.is_integer() {
        format!(
            "(0-9) type / (-) sign / (enter) commit / (tab) skip / (←) prev / {} / (esc)ape",
            finish
        )
    } else {
        format!("(1-9) choose / (tab) skip / (←) prev / {} / (esc)ape", finish)
    };
    Paragraph::new(Span::styled(legend, italic())).render(chunks[6], buf);
}

fn report_line(
    question: &Question,
    answer: Option<i64>,
    verdict: Verdict,
    status: QuestionStatus,
) -> Line<'static> {
    let (mark, color) = match verdict {
        Verdict::Correct => ("✓", Color::Green),
        Verdict::Incorrect => ("✗", Color::Red),
        Verdict::Unanswered => ("-", Color::Gray),
    };
    let yours = answer
        .map(|a| question.describe_answer(a))
        .unwrap_or_else(|| "Not answered".to_string());

    let mut spans = vec![
        Span::styled(format!("{} ", mark), bold().fg(color)),
        Span::styled(question.prompt.clone(), bold()),
        Span::raw(format!(
            "  your answer: {}, correct: {}",
            yours,
            question.describe_answer(question.correct_value())
        )),
    ];
    if let Some(span) = status_span(status).filter(|_| status != QuestionStatus::Locked) {
        spans.push(Span::raw("  "));
        spans.push(span);
    }
    Line::from(spans)
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let quiz = &app.quiz;
    let Some(result) = quiz.result() else {
        return;
    };
    let counts = quiz.counts();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // score
            Constraint::Length(1), // counts
            Constraint::Length(1), // padding
            Constraint::Min(1),    // per-question breakdown
            Constraint::Length(1), // save status
            Constraint::Length(1), // legend
        ])
        .split(area);

    let score_style = if result.is_perfect() {
        bold().fg(Color::Green)
    } else {
        bold().fg(Color::Cyan)
    };
    Paragraph::new(Span::styled(
        format!(
            "You scored {} out of {}!",
            result.score, result.total_questions
        ),
        score_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    Paragraph::new(Line::from(vec![
        Span::raw(format!("Answered: {}   ", counts.answered)),
        Span::styled(format!("Skipped: {}   ", counts.skipped), Style::default().fg(Color::Yellow)),
        Span::styled(format!("Timed Out: {}", counts.timed_out), Style::default().fg(Color::Red)),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    let lines: Vec<Line> = quiz
        .breakdown()
        .into_iter()
        .map(|r| report_line(r.question, r.answer, r.verdict, r.status))
        .collect();
    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);

    let save = match &app.save_status {
        SaveStatus::Idle => Span::raw(""),
        SaveStatus::Saving => Span::styled("saving result...", dim()),
        SaveStatus::Saved(_) => Span::styled("result saved to history", dim()),
        SaveStatus::Failed(msg) => Span::styled(
            format!("result not saved: {}", msg),
            Style::default().fg(Color::Red),
        ),
    };
    Paragraph::new(save)
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

    Paragraph::new(Span::styled("(n)ew quiz / (h)istory / (esc)ape", italic()))
        .render(chunks[5], buf);
}
