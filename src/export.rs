use chrono::SecondsFormat;
use itertools::Itertools;
use serde::Serialize;
use std::io::Write;

use crate::history::newest_first;
use crate::result::QuizResult;

#[derive(Debug, Serialize)]
struct Row {
    date: String,
    score: u32,
    total_questions: u32,
    percent: String,
    answers: String,
}

impl From<&QuizResult> for Row {
    fn from(r: &QuizResult) -> Self {
        Row {
            date: r.date.to_rfc3339_opts(SecondsFormat::Secs, false),
            score: r.score,
            total_questions: r.total_questions,
            percent: format!("{:.0}", r.percentage()),
            answers: r
                .answers
                .iter()
                .map(|(id, value)| format!("{}:{}", id, value))
                .join(";"),
        }
    }
}

/// Write the history as CSV, newest attempt first. Returns the row count.
pub fn write_csv<W: Write>(results: Vec<QuizResult>, writer: W) -> Result<usize, csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    let results = newest_first(results);
    for result in &results {
        wtr.serialize(Row::from(result))?;
    }
    wtr.flush()?;
    Ok(results.len())
}
