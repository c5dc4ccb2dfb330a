use std::io::IsTerminal;
use owo_colors::OwoColorize;
use serde::Serialize;
use terminal_size::{Width, terminal_size};

use crate::matrix::{CategoryRow, Choice, DecisionMatrix};
use crate::scoring::Scorecard;

/// Width of the bar chart bars in characters
const BAR_WIDTH: usize = 30;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
pub fn truncate_text(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format a raw or contribution value without trailing zeros ("5", "7.5", "0.233")
pub fn format_number(value: f64) -> String {
    let formatted = format!("{:.4}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn format_cell(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_else(|| "-".to_string())
}

/// Options for the full text report
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    pub use_colors: bool,
    /// Include the reasoning table for every category
    pub show_reasoning: bool,
}

/// Render the full report: matrix table, chart, recommendation, top factor
/// and (optionally) the reasoning table.
pub fn format_report(matrix: &DecisionMatrix, card: &Scorecard, options: ReportOptions) -> String {
    let mut sections = vec![
        section("Matrix Input + Live Scores", options.use_colors),
        format_matrix_table(&matrix.rows, card, options.use_colors),
        String::new(),
        section("Comparison Chart", options.use_colors),
        format_bar_chart(card, options.use_colors),
        String::new(),
        format_recommendation(card, options.use_colors),
        format_top_factor(card, options.use_colors),
    ];

    if options.show_reasoning {
        sections.push(String::new());
        sections.push(section("Reasoning for all categories", options.use_colors));
        sections.push(format_reasoning_table(&matrix.rows));
    }

    sections.join("\n")
}

fn section(title: &str, use_colors: bool) -> String {
    if use_colors {
        format!("{}", title.bold().underline())
    } else {
        format!("{}\n{}", title, "-".repeat(title.chars().count()))
    }
}

/// Format the augmented matrix: category, custom weight, raw values and
/// per-row contributions for every option.
pub fn format_matrix_table(rows: &[CategoryRow], card: &Scorecard, use_colors: bool) -> String {
    if rows.is_empty() {
        return "No categories found.".to_string();
    }

    let mut headers = vec!["Category".to_string(), "Custom Weight (%)".to_string()];
    headers.extend(Choice::ALL.iter().map(|c| c.label().to_string()));
    headers.extend(Choice::ALL.iter().map(|c| c.score_label().to_string()));

    let body: Vec<Vec<String>> = rows
        .iter()
        .zip(&card.weights)
        .zip(&card.contributions)
        .map(|((row, weight), contributions)| {
            let mut cells = vec![row.name.clone(), weight.to_string()];
            cells.extend(row.values.iter().map(|v| format_cell(*v)));
            cells.extend(contributions.iter().map(|c| format_number(*c)));
            cells
        })
        .collect();

    // Numeric column widths fit their header; category gets what is left
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for cells in &body {
        for (i, cell) in cells.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }
    if let Some(term_width) = get_terminal_width() {
        let fixed: usize = widths[1..].iter().map(|w| w + 2).sum();
        let available = term_width.saturating_sub(fixed).max(12);
        widths[0] = widths[0].min(available);
    }

    let render = |cells: &[String]| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                if i == 0 {
                    format!("{:<w$}", truncate_text(cell, widths[0]), w = widths[0])
                } else {
                    format!("{:>w$}", cell, w = widths[i])
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    };

    let header_line = render(&headers);
    let mut lines = vec![if use_colors {
        format!("{}", header_line.bold())
    } else {
        header_line
    }];

    for (idx, cells) in body.iter().enumerate() {
        let line = render(cells);
        if use_colors && card.top_factor.as_ref().is_some_and(|t| t.row == idx) {
            lines.push(format!("{}", line.green()));
        } else {
            lines.push(line);
        }
    }

    lines.join("\n")
}

fn paint(text: &str, choice: Choice) -> String {
    match choice {
        Choice::Clarkson => format!("{}", text.cyan()),
        Choice::ColumbiaNoEyuf => format!("{}", text.yellow()),
        Choice::ColumbiaWithEyuf => format!("{}", text.magenta()),
    }
}

/// Horizontal bar chart of option totals, highest score first
pub fn format_bar_chart(card: &Scorecard, use_colors: bool) -> String {
    let ranked = card.ranked();
    let max_total = ranked.iter().map(|(_, total)| *total).fold(0.0_f64, f64::max);
    let label_width = Choice::ALL
        .iter()
        .map(|c| c.label().chars().count())
        .max()
        .unwrap_or(0);

    ranked
        .iter()
        .map(|(choice, total)| {
            let ratio = if max_total > 0.0 {
                (total / max_total).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let filled = (ratio * BAR_WIDTH as f64).round() as usize;
            let empty = BAR_WIDTH.saturating_sub(filled);
            let label = format!("{:<w$}", choice.label(), w = label_width);
            let bar = "█".repeat(filled);
            let track = "░".repeat(empty);

            if use_colors {
                format!(
                    "{}  {}{}  {:.2}",
                    label,
                    paint(&bar, *choice),
                    track.dimmed(),
                    total.bold()
                )
            } else {
                format!("{}  {}{}  {:.2}", label, bar, track, total)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line recommendation naming the winner and its rounded score
pub fn format_recommendation(card: &Scorecard, use_colors: bool) -> String {
    let winner = card.winner.label();
    let score = card.winning_total();
    if use_colors {
        format!(
            "{} the best fit is {} with a score of {}.",
            "Based on your custom weights,".green(),
            winner.green().bold(),
            score.green().bold()
        )
    } else {
        format!(
            "Based on your custom weights, the best fit is {} with a score of {}.",
            winner, score
        )
    }
}

/// Top contributing category and its rationale
pub fn format_top_factor(card: &Scorecard, use_colors: bool) -> String {
    let Some(top) = &card.top_factor else {
        return "No categories to explain this decision.".to_string();
    };

    if use_colors {
        format!(
            "Top factor influencing this decision: {}\nWhy: {}",
            top.category.bold(),
            top.rationale.italic()
        )
    } else {
        format!(
            "Top factor influencing this decision: {}\nWhy: {}",
            top.category, top.rationale
        )
    }
}

/// Category and rationale for every row
pub fn format_reasoning_table(rows: &[CategoryRow]) -> String {
    if rows.is_empty() {
        return "No categories found.".to_string();
    }

    let name_width = rows
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Category".len());

    let mut lines = vec![format!("{:<w$}  Reasoning / Notes", "Category", w = name_width)];
    for row in rows {
        lines.push(format!("{:<w$}  {}", row.name, row.rationale, w = name_width));
    }
    lines.join("\n")
}

/// Format the matrix as tab-separated values for scripting.
/// One line per category followed by a TOTAL line; no colors.
pub fn format_tsv(rows: &[CategoryRow], card: &Scorecard) -> String {
    let mut header = vec!["Category", "Custom Weight (%)"];
    header.extend(Choice::ALL.iter().map(|c| c.label()));
    header.extend(Choice::ALL.iter().map(|c| c.score_label()));
    header.push("Reasoning / Notes");

    let mut lines = vec![header.join("\t")];

    for ((row, weight), contributions) in rows.iter().zip(&card.weights).zip(&card.contributions) {
        let mut cells = vec![sanitize_tsv(&row.name), weight.to_string()];
        cells.extend(row.values.iter().map(|v| v.map(|n| n.to_string()).unwrap_or_default()));
        cells.extend(contributions.iter().map(|c| c.to_string()));
        cells.push(sanitize_tsv(&row.rationale));
        lines.push(cells.join("\t"));
    }

    let mut total = vec!["TOTAL".to_string(), String::new(), String::new(), String::new(), String::new()];
    total.extend(card.totals.iter().map(|t| format!("{:.2}", t)));
    total.push(String::new());
    lines.push(total.join("\t"));

    lines.join("\n")
}

fn sanitize_tsv(text: &str) -> String {
    text.replace(['\t', '\n', '\r'], " ")
}

#[derive(Serialize)]
struct JsonReport<'a> {
    source: String,
    categories: Vec<JsonCategory<'a>>,
    totals: Vec<JsonTotal>,
    winner: &'static str,
    score: f64,
    top_factor: Option<&'a crate::scoring::TopFactor>,
}

#[derive(Serialize)]
struct JsonCategory<'a> {
    name: &'a str,
    base_weight: Option<f64>,
    weight: u8,
    values: [Option<f64>; 3],
    contributions: [f64; 3],
    rationale: &'a str,
}

#[derive(Serialize)]
struct JsonTotal {
    option: &'static str,
    score: f64,
}

/// Format the scored matrix as pretty-printed JSON
pub fn format_json(matrix: &DecisionMatrix, card: &Scorecard) -> anyhow::Result<String> {
    let categories = matrix
        .rows
        .iter()
        .zip(&card.weights)
        .zip(&card.contributions)
        .map(|((row, weight), contributions)| JsonCategory {
            name: &row.name,
            base_weight: row.base_weight,
            weight: *weight,
            values: row.values,
            contributions: *contributions,
            rationale: &row.rationale,
        })
        .collect();

    let report = JsonReport {
        source: matrix.source.display().to_string(),
        categories,
        totals: card
            .ranked()
            .into_iter()
            .map(|(choice, score)| JsonTotal {
                option: choice.label(),
                score,
            })
            .collect(),
        winner: card.winner.label(),
        score: card.winning_total(),
        top_factor: card.top_factor.as_ref(),
    };

    Ok(serde_json::to_string_pretty(&report)?)
}
