use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table, Widget, Wrap,
    },
};

use crate::history::{score_band, summarize, trend, HistoryState, HistoryView, ScoreBand};
use crate::result::QuizResult;
use crate::ui::charting::{compute_trend_bounds, format_label, PERCENT_BOUNDS};

const HORIZONTAL_MARGIN: u16 = 2;
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

fn band_color(band: ScoreBand) -> Color {
    match band {
        ScoreBand::Low => Color::Red,
        ScoreBand::Medium => Color::Yellow,
        ScoreBand::High => Color::Green,
    }
}

/// Pure presenter for a single attempt row
pub fn present_row(result: &QuizResult) -> Row<'static> {
    let color = band_color(score_band(result));
    Row::new(vec![
        Cell::from(result.date.format(DATE_FORMAT).to_string()),
        Cell::from(format!("{}/{}", result.score, result.total_questions))
            .style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(format!("{:.0}%", result.percentage())).style(Style::default().fg(color)),
    ])
}

pub fn render_history(view: &HistoryView, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Min(1),    // body
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled(
        "Quiz History",
        Style::default().add_modifier(Modifier::BOLD).fg(Color::Blue),
    ))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let legend = match &view.state {
        HistoryState::Failed(_) if view.confirm_reset => "(x) confirm reset / (b)ack / (esc)ape",
        HistoryState::Failed(_) => "(r)etry / (x) reset history / (n)ew quiz / (b)ack / (esc)ape",
        _ => "(↑/↓) scroll / (r)eload / (n)ew quiz / (b)ack / (esc)ape",
    };

    match &view.state {
        HistoryState::Loading => {
            Paragraph::new("Loading quiz history...")
                .alignment(Alignment::Center)
                .render(chunks[1], buf);
        }
        HistoryState::Failed(msg) => render_failure(msg, view.confirm_reset, chunks[1], buf),
        HistoryState::Loaded(results) if results.is_empty() => {
            Paragraph::new("No quiz attempts found. Take a quiz to see your history!")
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .render(chunks[1], buf);
        }
        HistoryState::Loaded(results) => {
            render_results(results, view.scroll_offset, chunks[1], buf)
        }
    }

    Paragraph::new(Span::styled(legend, Style::default().add_modifier(Modifier::ITALIC)))
        .render(chunks[2], buf);
}

fn render_failure(msg: &str, confirm_reset: bool, area: Rect, buf: &mut Buffer) {
    let mut lines = vec![
        Line::from(Span::styled(
            "Could not load quiz history",
            Style::default().add_modifier(Modifier::BOLD).fg(Color::Red),
        )),
        Line::from(msg.to_string()),
        Line::from(""),
    ];
    if confirm_reset {
        lines.push(Line::from(Span::styled(
            "This erases every saved result. Press (x) again to confirm.",
            Style::default().fg(Color::Yellow),
        )));
    } else {
        lines.push(Line::from("Resetting the history store may fix this."));
    }
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(area, buf);
}

fn render_results(results: &[QuizResult], scroll_offset: usize, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45), // trend chart
            Constraint::Length(1),      // summary
            Constraint::Min(3),         // table
        ])
        .split(area);

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let series = trend(results);
    let x_bounds = compute_trend_bounds(&series);
    let points: Vec<(f64, f64)> = series.into_iter().map(Into::into).collect();

    let datasets = vec![Dataset::default()
        .marker(Marker::Braille)
        .style(Style::default().fg(Color::Magenta))
        .graph_type(GraphType::Line)
        .data(&points)];

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("attempt")
                .bounds(x_bounds)
                .labels(vec![
                    Span::styled("1", bold_style),
                    Span::styled(format_label(x_bounds[1]), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("%")
                .bounds(PERCENT_BOUNDS)
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled("50", bold_style),
                    Span::styled("100", bold_style),
                ]),
        )
        .render(chunks[0], buf);

    if let Some(summary) = summarize(results) {
        Paragraph::new(Span::styled(
            format!(
                "{} attempts   {:.1}% avg   {:.0}% best   {:.2} sd",
                summary.attempts, summary.mean_percent, summary.best_percent, summary.std_dev
            ),
            bold_style,
        ))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);
    }

    let header = Row::new(vec!["Date", "Score", "Percent"]).style(bold_style);
    let rows: Vec<Row> = results.iter().skip(scroll_offset).map(present_row).collect();
    let table = Table::new(
        rows,
        [
            Constraint::Length(18),
            Constraint::Length(8),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title("Attempts"));

    Widget::render(table, chunks[2], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use chrono::{Local, TimeZone};
    use std::collections::BTreeMap;

    fn result(day: u32, score: u32) -> QuizResult {
        QuizResult {
            date: Local.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
            score,
            total_questions: 4,
            answers: BTreeMap::new(),
        }
    }

    fn rendered(view: &HistoryView) -> String {
        let area = Rect::new(0, 0, 90, 30);
        let mut buffer = Buffer::empty(area);
        render_history(view, area, &mut buffer);
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_present_row_does_not_panic() {
        let _ = present_row(&result(1, 3));
    }

    #[test]
    fn test_loading_and_empty() {
        let mut view = HistoryView::default();
        assert!(rendered(&view).contains("Loading quiz history"));
        view.on_loaded(Ok(vec![]));
        assert!(rendered(&view).contains("No quiz attempts found"));
    }

    #[test]
    fn test_loaded_lists_newest_first() {
        let mut view = HistoryView::default();
        view.on_loaded(Ok(vec![result(1, 1), result(2, 3)]));
        let content = rendered(&view);
        assert!(content.contains("2 attempts"));
        let newer = content.find("2024-03-02").unwrap();
        let older = content.find("2024-03-01").unwrap();
        assert!(newer < older);
        assert!(content.contains("75%"));
    }

    #[test]
    fn test_failure_offers_reset() {
        let mut view = HistoryView::default();
        view.on_loaded(Err(StoreError::ReadFailed("disk on fire".into())));
        let content = rendered(&view);
        assert!(content.contains("Could not load quiz history"));
        assert!(content.contains("(x) reset history"));

        view.request_reset();
        assert!(rendered(&view).contains("Press (x) again to confirm"));
    }
}
