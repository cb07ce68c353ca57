// src/report/pdf.rs
//! Laid-out lines → landscape A4 PDF, one PDF page per report page.

use anyhow::{Context, Result};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, StringFormat};

use super::render::{Line, Style};

// Points; A4 landscape.
const PAGE_WIDTH: i64 = 842;
const PAGE_HEIGHT: i64 = 595;
const MARGIN: i64 = 40;
const FOOTER_Y: i64 = 28;

/// Courier advance width, per 1000 units of font size.
const MONO_ADVANCE: i64 = 600;
const TABLE_SIZE: i64 = 8;
const MIN_TABLE_SCALE: i64 = 30;

struct Metrics {
    font: &'static str,
    size: i64,
    leading: i64,
}

fn metrics(style: Style) -> Metrics {
    let (font, size, leading) = match style {
        Style::Title => ("F2", 16, 22),
        Style::Subtitle => ("F1", 11, 15),
        Style::Meta => ("F1", 9, 22),
        Style::TableHead => ("F2", TABLE_SIZE, 11),
        Style::TableBody => ("F1", TABLE_SIZE, 11),
        Style::Footer => ("F1", 8, 0),
    };
    Metrics { font, size, leading }
}

fn base_font(name: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => name,
        "Encoding" => "WinAnsiEncoding",
    }
}

pub(super) fn encode(pages: &[Vec<Line>]) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular = doc.add_object(base_font("Courier"));
    let bold = doc.add_object(base_font("Courier-Bold"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let scale = table_scale(pages);
    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for lines in pages {
        let content = Content {
            operations: page_operations(lines, scale),
        };
        let stream = lopdf::Stream::new(
            Dictionary::new(),
            content.encode().context("encoding page content")?,
        );
        let content_id = doc.add_object(stream);
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).context("serializing PDF")?;
    Ok(buf)
}

/// Horizontal squeeze (percent) so the widest table line fits between the margins.
fn table_scale(pages: &[Vec<Line>]) -> i64 {
    let widest = pages
        .iter()
        .flatten()
        .filter(|l| matches!(l.style, Style::TableHead | Style::TableBody))
        .map(|l| l.text.chars().count() as i64)
        .max()
        .unwrap_or(0);
    let natural = widest * MONO_ADVANCE * TABLE_SIZE; // thousandths of a point
    if natural == 0 {
        return 100;
    }
    let available = (PAGE_WIDTH - 2 * MARGIN) * 1000;
    (available * 100 / natural).clamp(MIN_TABLE_SCALE, 100)
}

fn page_operations(lines: &[Line], table_scale: i64) -> Vec<Operation> {
    let mut ops = Vec::with_capacity(lines.len() * 6);
    let mut top = PAGE_HEIGHT - MARGIN;

    for line in lines {
        let m = metrics(line.style);
        let baseline = if line.style == Style::Footer {
            FOOTER_Y
        } else {
            let y = top - m.size;
            top -= m.leading;
            y
        };
        let scale = match line.style {
            Style::TableHead | Style::TableBody => table_scale,
            _ => 100,
        };

        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![Object::Name(m.font.as_bytes().to_vec()), m.size.into()],
        ));
        ops.push(Operation::new("Tz", vec![scale.into()]));
        ops.push(Operation::new("Td", vec![MARGIN.into(), baseline.into()]));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(win_ansi(&line.text), StringFormat::Literal)],
        ));
        ops.push(Operation::new("ET", vec![]));
    }
    ops
}

/// The standard Type1 fonts only cover WinAnsi; anything outside Latin-1 prints as `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7e | 0xa0..=0xff => c as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(style: Style, text: &str) -> Line {
        Line {
            style,
            text: text.to_string(),
        }
    }

    #[test]
    fn non_latin_text_degrades_to_question_marks() {
        assert_eq!(win_ansi("Jl. Café"), b"Jl. Caf\xe9".to_vec());
        assert_eq!(win_ansi("Ali 👍"), b"Ali ?".to_vec());
    }

    #[test]
    fn wide_tables_are_squeezed_but_not_below_minimum() {
        let narrow = vec![vec![line(Style::TableBody, "1  Ali")]];
        assert_eq!(table_scale(&narrow), 100);

        // 762pt available, 4.8pt per glyph: 200 glyphs need ~79%.
        let wide = vec![vec![line(Style::TableBody, &"x".repeat(200))]];
        assert_eq!(table_scale(&wide), 79);

        let absurd = vec![vec![line(Style::TableBody, &"x".repeat(5000))]];
        assert_eq!(table_scale(&absurd), MIN_TABLE_SCALE);
    }

    #[test]
    fn footer_sits_at_the_bottom_margin() {
        let ops = page_operations(
            &[line(Style::TableHead, "No"), line(Style::Footer, "Halaman 1 dari 1")],
            100,
        );
        let positions: Vec<&Vec<Object>> = ops
            .iter()
            .filter(|op| op.operator == "Td")
            .map(|op| &op.operands)
            .collect();
        assert!(matches!(positions[1][1], Object::Integer(y) if y == FOOTER_Y));
        assert!(matches!(
            positions[0][1],
            Object::Integer(y) if y == PAGE_HEIGHT - MARGIN - TABLE_SIZE
        ));
    }
}
