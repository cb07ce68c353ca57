// src/parse/records.rs

use serde::Serialize;

use super::header::{Field, HeaderMapping};

/// One normalized row of the registration sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registrant {
    /// 1-based position among the kept records, not the sheet row.
    pub sequence: usize,
    pub name: String,
    pub birth_info: String,
    pub father_name: String,
    pub mother_name: String,
    pub phone: String,
    pub address: String,
}

impl Registrant {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::BirthInfo => &self.birth_info,
            Field::FatherName => &self.father_name,
            Field::MotherName => &self.mother_name,
            Field::Phone => &self.phone,
            Field::Address => &self.address,
        }
    }

    fn from_row(mapping: &HeaderMapping, row: &[String]) -> Self {
        let cell = |field: Field| {
            row.get(mapping.column_for(field))
                .cloned()
                .unwrap_or_default()
        };
        Self {
            sequence: 0,
            name: cell(Field::Name),
            birth_info: cell(Field::BirthInfo),
            father_name: cell(Field::FatherName),
            mother_name: cell(Field::MotherName),
            phone: cell(Field::Phone),
            address: cell(Field::Address),
        }
    }
}

/// Build registrants from the data rows (everything after the header row).
///
/// Rows whose name is blank are dropped; the rest are numbered 1..N in row order.
pub fn build_records(mapping: &HeaderMapping, rows: &[Vec<String>]) -> Vec<Registrant> {
    rows.iter()
        .map(|row| Registrant::from_row(mapping, row))
        .filter(|r| !r.name.trim().is_empty())
        .enumerate()
        .map(|(i, mut r)| {
            r.sequence = i + 1;
            r
        })
        .collect()
}
