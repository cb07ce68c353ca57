// src/parse/mod.rs
//! Sheet export text → normalized registrants.

pub mod header;
pub mod records;
pub mod tokenize;

pub use header::{Field, HeaderMapping};
pub use records::{build_records, Registrant};
pub use tokenize::tokenize;

use tracing::debug;

use crate::error::FetchError;

/// Run the whole pipeline over one fetched body.
///
/// The first tokenized row is the header; a body with no rows at all is an
/// `EmptySource` error, while a header with no data rows is a valid empty sheet.
pub fn parse_registrants(text: &str) -> Result<Vec<Registrant>, FetchError> {
    let rows = tokenize(text);
    let (header, data) = rows.split_first().ok_or(FetchError::EmptySource)?;

    let mapping = HeaderMapping::resolve(header);
    let unresolved: Vec<Field> = mapping.unresolved().collect();
    if !unresolved.is_empty() {
        debug!(?unresolved, "headers not found, using positional fallback");
    }

    Ok(build_records(&mapping, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn parses_a_sheet_export() -> Result<()> {
        let text = "Timestamp,Nama Anak,Tanggal Lahir,Nama Ayah,Nama Ibu,No HP,Alamat\r\n\
                    1/10/2025 10:00:00,Ali,\"Bogor, 1 Jan 2015\",Udin,Siti,0812,Jl. X\r\n\
                    1/10/2025 10:05:00,,,,,,\r\n\
                    1/10/2025 10:07:00,Budi,2016,Asep,Rina,0813,\"Jl. Y, RT 2\"\r\n";
        let records = parse_registrants(text)?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Ali");
        assert_eq!(records[0].birth_info, "Bogor, 1 Jan 2015");
        assert_eq!(records[1].sequence, 2);
        assert_eq!(records[1].address, "Jl. Y, RT 2");
        Ok(())
    }

    #[test]
    fn header_only_is_an_empty_roster() -> Result<()> {
        assert!(parse_registrants("Nama Anak,TTL\n")?.is_empty());
        Ok(())
    }

    #[test]
    fn blank_body_is_empty_source() {
        assert!(matches!(
            parse_registrants("\n  \n"),
            Err(FetchError::EmptySource)
        ));
    }
}
