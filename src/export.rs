use chrono::prelude::*;
use clap::ValueEnum;
use csv::WriterBuilder;
use serde::Serialize;
use thiserror::Error;

use crate::charts::{ChartSet, RenderedCharts};
use crate::report::AnalysisReport;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    #[default]
    Txt,
    Csv,
    Tsv,
    Json,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV buffer is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("CSV buffer flush failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Extra, optional sections printed alongside a report.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExportExtras<'a> {
    pub charts: Option<&'a RenderedCharts>,
    pub genre: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonExport<'a> {
    #[serde(flatten)]
    report: &'a AnalysisReport,
    charts: ChartSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    genre: Option<&'a str>,
}

/// Neutralise spreadsheet formulas by prefixing risky cells with a single quote.
/// # Example
/// ```
/// use manuscript_analysis::csv_safe_cell;
/// assert_eq!(csv_safe_cell("=SUM(A1)".to_string()), "'=SUM(A1)");
/// assert_eq!(csv_safe_cell("'=already".to_string()), "'=already");
/// assert_eq!(csv_safe_cell("night".to_string()), "night");
/// ```
pub fn csv_safe_cell(cell: String) -> String {
    match cell.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r') => format!("'{cell}"),
        _ => cell,
    }
}

/// Renders `report` in `format`.
pub fn render(
    report: &AnalysisReport,
    format: ExportFormat,
    extras: ExportExtras<'_>,
) -> Result<String, ExportError> {
    match format {
        ExportFormat::Txt => Ok(render_txt(report, extras)),
        ExportFormat::Csv => render_delimited(report, extras, b','),
        ExportFormat::Tsv => render_delimited(report, extras, b'\t'),
        ExportFormat::Json => {
            let export = JsonExport {
                report,
                charts: ChartSet::from_report(report),
                genre: extras.genre,
            };
            Ok(serde_json::to_string_pretty(&export)?)
        }
    }
}

fn render_txt(report: &AnalysisReport, extras: ExportExtras<'_>) -> String {
    let local: DateTime<Local> = Local::now();
    let m = &report.metrics;
    let c = &report.composition;

    let mut out = format!(
        "Manuscript analysis ({})\n\nResults\n",
        local.format("%Y-%m-%d %H:%M:%S")
    );
    out.push_str(&format!("  Words: {}\n", m.word_count));
    out.push_str(&format!("  Unique Words: {}\n", m.unique_word_count));
    out.push_str(&format!("  Sentences: {}\n", m.sentence_count));
    out.push_str(&format!(
        "  Reading Level (Flesch-Kincaid): Grade {:.2}\n",
        m.readability_grade
    ));
    out.push_str(&format!("  Dialogue (chars): {}\n", c.dialogue_chars));
    out.push_str(&format!("  Summary (chars): {}\n", c.summary_chars));
    out.push_str(&format!("  Action Keywords: {}\n", c.action_count));
    out.push_str(&format!("  Setting Keywords: {}\n", c.setting_count));
    out.push_str(&format!("  Character References: {}\n", c.character_count));

    out.push_str("\nRepeated phrases\n");
    if report.repeated_phrases.is_empty() {
        out.push_str("  (none)\n");
    }
    for p in &report.repeated_phrases {
        out.push_str(&format!("  {:?} x{}\n", p.phrase, p.count));
    }

    if let Some(charts) = extras.charts {
        out.push('\n');
        out.push_str(charts.text());
    }
    if let Some(genre) = extras.genre {
        out.push_str("\nGenre and recommendations\n");
        out.push_str(genre.trim_end());
        out.push('\n');
    }
    out
}

fn render_delimited(
    report: &AnalysisReport,
    extras: ExportExtras<'_>,
    delimiter: u8,
) -> Result<String, ExportError> {
    let m = &report.metrics;
    let c = &report.composition;
    let mut rows: Vec<(String, String, String)> = vec![
        row("metrics", "word_count", m.word_count),
        row("metrics", "unique_word_count", m.unique_word_count),
        row("metrics", "sentence_count", m.sentence_count),
        row(
            "metrics",
            "readability_grade",
            format!("{:.2}", m.readability_grade),
        ),
        row("composition", "dialogue_chars", c.dialogue_chars),
        row("composition", "summary_chars", c.summary_chars),
        row("composition", "action_count", c.action_count),
        row("composition", "setting_count", c.setting_count),
        row("composition", "character_count", c.character_count),
    ];
    for p in &report.repeated_phrases {
        rows.push(row("phrase", &p.phrase, p.count));
    }
    for cloud in &report.word_clouds {
        let section = format!("cloud:{}", cloud.segment);
        for e in &cloud.words {
            rows.push(row(&section, &e.word, e.count));
        }
    }
    if let Some(genre) = extras.genre {
        rows.push(row("genre", "advice", genre));
    }

    let mut buf = Vec::new();
    {
        let mut wtr = WriterBuilder::new().delimiter(delimiter).from_writer(&mut buf);
        wtr.write_record(["section", "item", "value"])?;
        for (section, item, value) in rows {
            wtr.write_record([section, csv_safe_cell(item), csv_safe_cell(value)])?;
        }
        wtr.flush()?;
    }
    Ok(String::from_utf8(buf)?)
}

fn row(section: &str, item: &str, value: impl ToString) -> (String, String, String) {
    (section.to_string(), item.to_string(), value.to_string())
}
