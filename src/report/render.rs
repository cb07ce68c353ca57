// src/report/render.rs

use std::fmt::Write as _;

use super::{Report, COLUMNS};

const GAP: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Style {
    Title,
    Subtitle,
    Meta,
    TableHead,
    TableBody,
    Footer,
}

/// One line of text placed on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Line {
    pub style: Style,
    pub text: String,
}

impl Line {
    fn new(style: Style, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }
}

/// Every page as styled lines, top to bottom. The footer is always last.
///
/// Table cells are padded to shared column widths, so a monospaced font keeps
/// the columns aligned across pages.
pub(super) fn page_lines(report: &Report) -> Vec<Vec<Line>> {
    let widths = column_widths(report);
    let rule_len = widths.iter().sum::<usize>() + GAP.len() * (widths.len() - 1);

    report
        .pages
        .iter()
        .map(|page| {
            let mut lines = Vec::with_capacity(page.rows.len() + 8);
            if page.number == 1 {
                lines.push(Line::new(Style::Title, report.title.as_str()));
                for sub in &report.subtitle {
                    lines.push(Line::new(Style::Subtitle, sub.as_str()));
                }
                lines.push(Line::new(
                    Style::Meta,
                    format!("Dicetak: {}", report.printed_at.format("%d/%m/%Y %H.%M.%S")),
                ));
            }
            lines.push(Line::new(Style::TableHead, row_text(&COLUMNS.map(String::from), &widths)));
            lines.push(Line::new(Style::TableHead, "-".repeat(rule_len)));
            for row in &page.rows {
                lines.push(Line::new(Style::TableBody, row_text(row, &widths)));
            }
            lines.push(Line::new(Style::Footer, report.footer(page)));
            lines
        })
        .collect()
}

fn column_widths(report: &Report) -> [usize; 7] {
    let mut widths = COLUMNS.map(|c| c.chars().count());
    for row in report.pages.iter().flat_map(|p| &p.rows) {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }
    widths
}

fn row_text(row: &[String; 7], widths: &[usize; 7]) -> String {
    let mut line = String::new();
    for (i, (cell, width)) in row.iter().zip(widths).enumerate() {
        if i > 0 {
            line.push_str(GAP);
        }
        let _ = write!(line, "{:<width$}", cell, width = *width);
    }
    line.trim_end().to_string()
}
