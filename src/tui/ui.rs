use ratatui::prelude::*;
use ratatui::widgets::{Block, Cell, Clear, Paragraph, Row, Table, Wrap};

use crate::matrix::Choice;
use crate::output::{format_number, truncate_text};
use crate::scoring::{Scorecard, MAX_WEIGHT};
use crate::tui::app::{App, InputMode};
use crate::tui::theme::ThemeColors;

const TITLE: &str = "Decision Matrix";
const SIDEBAR_WIDTH: u16 = 40;
const SLIDER_WIDTH: usize = 15;
const CHART_BAR_WIDTH: usize = 24;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Handle very small terminal sizes gracefully
    if area.height < 12 || area.width < 60 {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Layout: Title(1) + Body(fill) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);

    let body = Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Fill(1)])
        .split(chunks[1]);

    render_title(frame, chunks[0], app);
    render_sidebar(frame, body[0], app);
    render_main(frame, body[1], app);
    render_status_bar(frame, chunks[2], app);

    if app.input_mode == InputMode::Help {
        render_help_popup(frame, &app.colors);
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let source = app.matrix.source.display().to_string();
    let left_len = TITLE.len();
    let padding_len = (area.width as usize).saturating_sub(left_len + source.chars().count());

    let title = Line::from(vec![
        Span::styled(TITLE, Style::default().fg(app.colors.title_color).bold()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(source, Style::default().fg(app.colors.muted)),
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

/// Slider bar for a weight: "██████░░░░░░░░░"
fn slider(weight: u8, width: usize, colors: &ThemeColors) -> Line<'static> {
    let ratio = weight as f64 / MAX_WEIGHT as f64;
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);

    let mut spans = Vec::new();
    if filled > 0 {
        spans.push(Span::styled("█".repeat(filled), Style::default().fg(colors.slider_filled)));
    }
    if empty > 0 {
        spans.push(Span::styled("░".repeat(empty), Style::default().fg(colors.slider_empty)));
    }
    Line::from(spans)
}

fn render_sidebar(frame: &mut Frame, area: Rect, app: &mut App) {
    let block = Block::bordered().title(" Adjust Category Weights ");

    if app.matrix.rows.is_empty() {
        let empty_msg = Paragraph::new("No categories")
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty_msg, area);
        return;
    }

    let name_width = (area.width as usize).saturating_sub(SLIDER_WIDTH + 8);
    let colors = &app.colors;

    let rows: Vec<Row> = app
        .matrix
        .rows
        .iter()
        .zip(app.weights.current())
        .enumerate()
        .map(|(idx, (row, &weight))| {
            let marker = if app.weights.is_customized(idx) {
                Span::styled("*", Style::default().fg(colors.customized))
            } else {
                Span::raw(" ")
            };
            let name = Line::from(vec![marker, Span::raw(truncate_text(&row.name, name_width))]);

            Row::new(vec![
                Cell::from(name),
                Cell::from(slider(weight, SLIDER_WIDTH, colors)),
                Cell::from(format!("{:>2}", weight)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(1),
        Constraint::Length(SLIDER_WIDTH as u16),
        Constraint::Length(2),
    ];

    let table = Table::new(rows, widths)
        .block(block)
        .row_highlight_style(colors.row_selected);

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_main(frame: &mut Frame, area: Rect, app: &App) {
    let Some(card) = &app.scorecard else {
        let msg = app.score_error.as_deref().unwrap_or("Scores unavailable");
        let error = Paragraph::new(msg)
            .style(Style::default().fg(app.colors.flash_error))
            .wrap(Wrap { trim: true })
            .block(Block::bordered().title(" Scoring failed "));
        frame.render_widget(error, area);
        return;
    };

    let reasoning_height = if app.show_reasoning {
        (app.matrix.rows.len() as u16 + 3).min(area.height / 3)
    } else {
        0
    };

    let chunks = Layout::vertical([
        Constraint::Fill(1),                   // Matrix table
        Constraint::Length(5),                 // Chart
        Constraint::Length(4),                 // Recommendation
        Constraint::Length(reasoning_height),  // Reasoning (collapsed when 0)
    ])
    .split(area);

    render_matrix(frame, chunks[0], app, card);
    render_chart(frame, chunks[1], &app.colors, card);
    render_recommendation(frame, chunks[2], &app.colors, card);
    if app.show_reasoning {
        render_reasoning(frame, chunks[3], app);
    }
}

fn render_matrix(frame: &mut Frame, area: Rect, app: &App, card: &Scorecard) {
    let colors = &app.colors;
    let selected = app.selected_index();

    let rows: Vec<Row> = app
        .matrix
        .rows
        .iter()
        .zip(&card.weights)
        .zip(&card.contributions)
        .enumerate()
        .map(|(idx, ((row, weight), contributions))| {
            let mut cells = vec![Cell::from(row.name.clone()), Cell::from(weight.to_string())];
            cells.extend(row.values.iter().map(|v| {
                Cell::from(v.map(format_number).unwrap_or_else(|| "-".to_string()))
            }));
            cells.extend(Choice::ALL.iter().map(|&c| {
                Cell::from(format_number(contributions[c.index()]))
                    .style(Style::default().fg(colors.option_color(c)))
            }));

            let mut style = if idx % 2 == 1 {
                Style::default().bg(colors.row_alt_bg)
            } else {
                Style::default()
            };
            if selected == Some(idx) {
                style = style.bold();
            }
            if card.top_factor.as_ref().is_some_and(|t| t.row == idx) {
                style = style.fg(colors.top_factor);
            }
            Row::new(cells).style(style)
        })
        .collect();

    let mut header = vec!["Category".to_string(), "Wt".to_string()];
    header.extend(Choice::ALL.iter().map(|c| c.label().to_string()));
    header.extend(Choice::ALL.iter().map(|c| c.score_label().to_string()));

    let mut widths = vec![Constraint::Fill(1), Constraint::Length(3)];
    widths.extend(Choice::ALL.iter().map(|c| Constraint::Length(c.label().len() as u16)));
    widths.extend(Choice::ALL.iter().map(|c| Constraint::Length(c.score_label().len() as u16)));

    let table = Table::new(rows, widths)
        .header(Row::new(header).style(colors.header_style).bottom_margin(1))
        .block(Block::bordered().title(" Matrix Input + Live Scores "));

    frame.render_widget(table, area);
}

fn render_chart(frame: &mut Frame, area: Rect, colors: &ThemeColors, card: &Scorecard) {
    let ranked = card.ranked();
    let max_total = ranked.iter().map(|(_, t)| *t).fold(0.0_f64, f64::max);
    let label_width = Choice::ALL.iter().map(|c| c.label().len()).max().unwrap_or(0);

    let lines: Vec<Line> = ranked
        .iter()
        .map(|(choice, total)| {
            let ratio = if max_total > 0.0 { (total / max_total).clamp(0.0, 1.0) } else { 0.0 };
            let filled = (ratio * CHART_BAR_WIDTH as f64).round() as usize;
            let empty = CHART_BAR_WIDTH.saturating_sub(filled);
            let color = colors.option_color(*choice);

            Line::from(vec![
                Span::styled(format!("{:<w$} ", choice.label(), w = label_width), Style::default().fg(color)),
                Span::styled("█".repeat(filled), Style::default().fg(color)),
                Span::styled("░".repeat(empty), Style::default().fg(colors.slider_empty)),
                Span::styled(format!(" {:.2}", total), Style::default().bold()),
            ])
        })
        .collect();

    let chart = Paragraph::new(lines).block(Block::bordered().title(" Comparison Chart "));
    frame.render_widget(chart, area);
}

fn render_recommendation(frame: &mut Frame, area: Rect, colors: &ThemeColors, card: &Scorecard) {
    let winner_style = Style::default().fg(colors.winner);
    let mut lines = vec![Line::from(vec![
        Span::styled("Based on your custom weights, the best fit is ", winner_style),
        Span::styled(card.winner.label(), winner_style.bold()),
        Span::styled(format!(" with a score of {}.", card.winning_total()), winner_style),
    ])];

    match &card.top_factor {
        Some(top) => {
            lines.push(Line::from(vec![
                Span::raw("Top factor influencing this decision: "),
                Span::styled(top.category.clone(), Style::default().bold()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Why: ", Style::default().fg(colors.muted)),
                Span::styled(top.rationale.clone(), Style::default().italic()),
            ]));
        }
        None => lines.push(Line::from("No categories to explain this decision.")),
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}

fn render_reasoning(frame: &mut Frame, area: Rect, app: &App) {
    let rows: Vec<Row> = app
        .matrix
        .rows
        .iter()
        .map(|row| Row::new(vec![Cell::from(row.name.clone()), Cell::from(row.rationale.clone())]))
        .collect();

    let name_width = app
        .matrix
        .rows
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Category".len()) as u16;

    let table = Table::new(rows, [Constraint::Length(name_width), Constraint::Fill(1)])
        .header(Row::new(vec!["Category", "Reasoning / Notes"]).style(app.colors.header_style))
        .block(Block::bordered().title(" Full reasoning (n to collapse) "));

    frame.render_widget(table, area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let colors = &app.colors;
    let text = if let Some((ref msg, _)) = app.flash_message {
        Line::from(Span::styled(msg.clone(), Style::default().fg(colors.flash_success)))
    } else if app.score_error.is_some() {
        Line::from(Span::styled(
            "Scoring failed: adjust the source or rerun with --missing-values zero",
            Style::default().fg(colors.flash_error),
        ))
    } else {
        let hints = [
            ("j/k", ":nav "),
            ("h/l", ":±1 "),
            ("H/L", ":±5 "),
            ("r", ":reset "),
            ("R", ":reset all "),
            ("n", ":notes "),
            ("?", ":help "),
            ("q", ":quit"),
        ];

        let count = format!("{} categories  ", app.matrix.rows.len());
        let mut spans = vec![Span::styled(count, Style::default().fg(colors.muted))];
        for (key, label) in hints {
            spans.push(Span::styled(key, Style::default().fg(colors.status_key_color)));
            spans.push(Span::raw(label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(colors.status_bar_bg)),
        area,
    );
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Render the help overlay popup
fn render_help_popup(frame: &mut Frame, colors: &ThemeColors) {
    let popup_area = centered_rect_fixed(50, 15, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(" Keyboard Shortcuts ")
        .title_style(colors.popup_title)
        .border_style(Style::default().fg(colors.popup_border));
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let key_style = Style::default().fg(colors.status_key_color).bold();
    let entries = [
        ("j / Down      ", "Next category"),
        ("k / Up        ", "Previous category"),
        ("l / Right     ", "Weight +1"),
        ("h / Left      ", "Weight -1"),
        ("L / H         ", "Weight +5 / -5"),
        ("0 / m         ", "Weight to 0 / 30"),
        ("r             ", "Reset selected weight"),
        ("R             ", "Reset all weights"),
        ("n             ", "Show/hide full reasoning"),
        ("?             ", "Show/hide this help"),
        ("q / Esc       ", "Quit"),
    ];

    let mut help_lines: Vec<Line> = entries
        .iter()
        .map(|(key, action)| Line::from(vec![Span::styled(*key, key_style), Span::raw(*action)]))
        .collect();
    help_lines.push(Line::from(""));
    help_lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(colors.muted),
    )));

    frame.render_widget(Paragraph::new(help_lines), inner);
}
