use log::debug;
use serde::{Deserialize, Serialize};

use crate::report::{AnalysisReport, WordCloud};

/// Width of the longest bar when drawn in a terminal.
pub const DEFAULT_BAR_WIDTH: usize = 40;
/// Widest bar `render_charts` will draw; larger widths are clamped.
pub const MAX_CHART_WIDTH: usize = 500;
/// Words listed per cloud in the terminal view.
const CLOUD_PREVIEW_WORDS: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub label: String,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    pub title: String,
    pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub label: String,
    pub value: usize,
    /// Share of the pie, 0–100. Every slice is 0 when the pie is empty.
    pub percent: f64,
}

impl PieSlice {
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.percent)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<PieSlice>,
}

/// The data behind every visualization of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSet {
    pub composition: BarChart,
    pub breakdown: PieChart,
    pub clouds: Vec<WordCloud>,
}

impl ChartSet {
    pub fn from_report(report: &AnalysisReport) -> Self {
        let c = &report.composition;
        let composition = BarChart {
            title: "Narrative Composition".to_string(),
            bars: vec![
                bar("Dialogue (chars)", c.dialogue_chars),
                bar("Action (keywords)", c.action_count),
                bar("Setting (keywords)", c.setting_count),
            ],
        };
        let breakdown = PieChart {
            title: "Text Breakdown".to_string(),
            slices: pie_slices(&[
                ("Summary", c.summary_chars),
                ("Setting", c.setting_count),
                ("Action", c.action_count),
                ("Dialogue", c.dialogue_chars),
                ("Characters", c.character_count),
            ]),
        };
        Self {
            composition,
            breakdown,
            clouds: report.word_clouds.clone(),
        }
    }
}

fn bar(label: &str, value: usize) -> Bar {
    Bar {
        label: label.to_string(),
        value,
    }
}

/// Turns `(label, value)` pairs into slices with their share of the total.
pub fn pie_slices(parts: &[(&str, usize)]) -> Vec<PieSlice> {
    let total: usize = parts.iter().map(|(_, v)| v).sum();
    parts
        .iter()
        .map(|&(label, value)| PieSlice {
            label: label.to_string(),
            value,
            percent: if total == 0 {
                0.0
            } else {
                value as f64 * 100.0 / total as f64
            },
        })
        .collect()
}

/// A chart set together with its terminal drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedCharts {
    charts: ChartSet,
    text: String,
}

impl RenderedCharts {
    pub fn charts(&self) -> &ChartSet {
        &self.charts
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Draws the charts for `report`, consuming whatever was drawn before.
///
/// The previous drawing is dropped, never merged into the new one.
pub fn render_charts(
    previous: Option<RenderedCharts>,
    report: &AnalysisReport,
    width: usize,
) -> RenderedCharts {
    if let Some(old) = previous {
        debug!("discarding previous charts ({} bytes)", old.text.len());
        drop(old);
    }
    let charts = ChartSet::from_report(report);
    let text = draw(&charts, width.clamp(1, MAX_CHART_WIDTH));
    RenderedCharts { charts, text }
}

fn draw(charts: &ChartSet, width: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", charts.composition.title));
    let label_width = charts
        .composition
        .bars
        .iter()
        .map(|b| b.label.chars().count())
        .max()
        .unwrap_or(0);
    let max_value = charts.composition.bars.iter().map(|b| b.value).max().unwrap_or(0);
    for b in &charts.composition.bars {
        let len = scaled(b.value, max_value, width);
        out.push_str(&format!(
            "  {:<label_width$} | {} {}\n",
            b.label,
            "█".repeat(len),
            b.value
        ));
    }

    out.push_str(&format!("\n{}\n", charts.breakdown.title));
    for s in &charts.breakdown.slices {
        let len = (s.percent / 100.0 * width as f64).round() as usize;
        out.push_str(&format!(
            "  {:<10} | {:<width$} {:>6}\n",
            s.label,
            "▒".repeat(len),
            s.percent_label()
        ));
    }

    for cloud in &charts.clouds {
        out.push_str(&format!("\nWord cloud: {}\n  ", cloud.segment));
        if cloud.words.is_empty() {
            out.push_str("(empty)\n");
            continue;
        }
        let preview: Vec<String> = cloud
            .words
            .iter()
            .take(CLOUD_PREVIEW_WORDS)
            .map(|e| format!("{}({})", e.word, e.count))
            .collect();
        out.push_str(&preview.join(" "));
        out.push('\n');
    }
    out
}

fn scaled(value: usize, max: usize, width: usize) -> usize {
    if max == 0 {
        0
    } else {
        ((value as f64 / max as f64) * width as f64).round() as usize
    }
}
