// src/parse/tokenize.rs

use std::mem::take;

/// Split sheet export text into rows of trimmed fields.
///
/// This is a single-pass quote toggle, not a full CSV grammar:
/// - `"` flips the quoted flag and is never copied, so `""` does not yield a literal quote;
/// - lines are split before quotes are tracked, so a quoted field cannot span lines;
/// - unbalanced quotes never fail, the flag just stays set until end of line.
pub fn tokenize(text: &str) -> Vec<Vec<String>> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(split_line)
        .collect()
}

fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(take(&mut field)),
            _ => field.push(ch),
        }
    }
    fields.push(field);

    fields.into_iter().map(|f| f.trim().to_string()).collect()
}
