// src/report/mod.rs
//! Printable roster: a title block, one table split across pages with the
//! header repeated, and a page/quota footer on every page, written as a PDF.

mod pdf;
mod render;

use std::{fs, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tracing::info;

use crate::config::ReportSettings;
use crate::parse::{Field, Registrant};

pub const COLUMNS: [&str; 7] = [
    "No",
    "Nama Anak",
    "Tanggal Lahir",
    "Nama Ayah",
    "Nama Ibu",
    "No HP / WhatsApp",
    "Alamat",
];

const EMPTY_CELL: &str = "-";

/// Seats left; never negative.
pub fn quota_remaining(quota: usize, registered: usize) -> usize {
    quota.saturating_sub(registered)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 1-based.
    pub number: usize,
    pub rows: Vec<[String; 7]>,
}

#[derive(Debug, Clone)]
pub struct Report {
    pub title: String,
    pub subtitle: Vec<String>,
    pub printed_at: DateTime<Local>,
    pub registered: usize,
    pub quota: usize,
    pub pages: Vec<Page>,
}

impl Report {
    /// Lay out `records` in their given order. Zero records still yield one page.
    pub fn build(
        records: &[Registrant],
        quota: usize,
        settings: &ReportSettings,
        printed_at: DateTime<Local>,
    ) -> Self {
        let first = settings.first_page_rows.max(1);
        let rest = settings.rows_per_page.max(1);

        let mut rows = records.iter().map(table_row);
        let mut pages = vec![Page {
            number: 1,
            rows: rows.by_ref().take(first).collect(),
        }];
        loop {
            let chunk: Vec<_> = rows.by_ref().take(rest).collect();
            if chunk.is_empty() {
                break;
            }
            pages.push(Page {
                number: pages.len() + 1,
                rows: chunk,
            });
        }

        Self {
            title: settings.title.clone(),
            subtitle: settings.subtitle.clone(),
            printed_at,
            registered: records.len(),
            quota,
            pages,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn footer(&self, page: &Page) -> String {
        format!(
            "Halaman {} dari {} - Total Pendaftar: {} dari {} kuota",
            page.number,
            self.page_count(),
            self.registered,
            self.quota
        )
    }

    /// `<prefix>_<YYYY-MM-DD>.pdf`, dated by print time.
    pub fn file_name(&self, prefix: &str) -> String {
        format!("{}_{}.pdf", prefix, self.printed_at.format("%Y-%m-%d"))
    }

    /// Landscape A4 PDF bytes, one PDF page per report page.
    pub fn to_pdf(&self) -> Result<Vec<u8>> {
        pdf::encode(&render::page_lines(self))
    }
}

fn table_row(r: &Registrant) -> [String; 7] {
    let mut row: [String; 7] = Default::default();
    row[0] = r.sequence.to_string();
    for (i, field) in Field::ALL.into_iter().enumerate() {
        let value = r.get(field);
        row[i + 1] = if value.trim().is_empty() {
            EMPTY_CELL.to_string()
        } else {
            value.to_string()
        };
    }
    row
}

/// Lay out, render and write the report into `settings.dir`, returning the file path.
pub fn write_report(
    records: &[Registrant],
    quota: usize,
    settings: &ReportSettings,
    printed_at: DateTime<Local>,
) -> Result<PathBuf> {
    let report = Report::build(records, quota, settings, printed_at);
    write_rendered(&report, &settings.dir, &settings.file_prefix)
}

fn write_rendered(report: &Report, dir: &Path, prefix: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating report directory {:?}", dir))?;
    let path = dir.join(report.file_name(prefix));
    let bytes = report.to_pdf().context("rendering report")?;
    fs::write(&path, bytes).with_context(|| format!("writing report {:?}", path))?;
    info!(
        path = %path.display(),
        pages = report.page_count(),
        records = report.registered,
        "report written"
    );
    Ok(path)
}
