// src/parse/header.rs

/// The normalized attributes every registrant exposes, in declared order.
///
/// The declared order doubles as the positional fallback used when a
/// field's header cannot be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    BirthInfo,
    FatherName,
    MotherName,
    Phone,
    Address,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Name,
        Field::BirthInfo,
        Field::FatherName,
        Field::MotherName,
        Field::Phone,
        Field::Address,
    ];

    /// Lower-case header substrings, highest priority first.
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            Field::Name => &["nama anak", "nama anak/ peserta", "nama"],
            Field::BirthInfo => &["tanggal lahir", "tgl lahir", "ttl", "tanggal"],
            Field::FatherName => &["nama ayah", "ayah", "nama ayah / wali"],
            Field::MotherName => &["nama ibu", "ibu"],
            Field::Phone => &["no hp", "no handphone", "whatsapp", "no wa", "phone", "hp"],
            Field::Address => &["alamat", "address"],
        }
    }

    /// Column used when no header matched.
    pub fn fallback_index(self) -> usize {
        self as usize
    }
}

/// Canonical field → source column, built once per fetch cycle from the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeaderMapping {
    columns: [Option<usize>; 6],
}

impl HeaderMapping {
    /// Match each field's candidates against the header cells.
    ///
    /// Candidate priority beats column position: the first candidate that is
    /// contained in any cell wins, and among cells containing it the leftmost wins.
    pub fn resolve(header: &[String]) -> Self {
        let lowered: Vec<String> = header.iter().map(|h| h.to_lowercase()).collect();
        let mut columns = [None; 6];
        for field in Field::ALL {
            columns[field as usize] = field
                .candidates()
                .iter()
                .find_map(|cand| lowered.iter().position(|h| h.contains(cand)));
        }
        Self { columns }
    }

    /// Resolved column for `field`, or `None` when unresolved.
    pub fn get(&self, field: Field) -> Option<usize> {
        self.columns[field as usize]
    }

    /// Resolved column, else the field's positional fallback.
    pub fn column_for(&self, field: Field) -> usize {
        self.get(field).unwrap_or_else(|| field.fallback_index())
    }

    pub fn unresolved(&self) -> impl Iterator<Item = Field> + '_ {
        Field::ALL.into_iter().filter(|f| self.get(*f).is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn short_form_headers_resolve() {
        let m = HeaderMapping::resolve(&header(&["Nama Anak", "TTL", "Ayah", "Ibu", "No WA", "Alamat"]));
        for (i, field) in Field::ALL.into_iter().enumerate() {
            assert_eq!(m.get(field), Some(i), "{field:?}");
        }
    }

    #[test]
    fn google_form_export_with_timestamp_column() {
        let m = HeaderMapping::resolve(&header(&[
            "Timestamp",
            "Nama Ayah / Wali",
            "Nama Ibu",
            "Nama Anak / Peserta",
            "Tanggal Lahir Anak",
            "Alamat Lengkap",
            "No HP / WhatsApp",
        ]));
        assert_eq!(m.get(Field::Name), Some(3));
        assert_eq!(m.get(Field::FatherName), Some(1));
        assert_eq!(m.get(Field::MotherName), Some(2));
        assert_eq!(m.get(Field::BirthInfo), Some(4));
        assert_eq!(m.get(Field::Address), Some(5));
        assert_eq!(m.get(Field::Phone), Some(6));
    }

    #[test]
    fn candidate_priority_beats_column_order() {
        // "nama" alone would hit column 0 first, but "nama anak" is tried earlier.
        let m = HeaderMapping::resolve(&header(&["Nama Ayah", "Nama Anak"]));
        assert_eq!(m.get(Field::Name), Some(1));
        assert_eq!(m.get(Field::FatherName), Some(0));
    }

    #[test]
    fn loose_candidate_can_hit_unintended_column() {
        // Without a "nama anak" header, "nama" lands on the leftmost "nama ..." cell.
        let m = HeaderMapping::resolve(&header(&["Nama Ibu", "Nama Peserta"]));
        assert_eq!(m.get(Field::Name), Some(0));
    }

    #[test]
    fn resolution_is_deterministic() {
        let h = header(&["No", "Nama", "TTL", "HP", "Address"]);
        assert_eq!(HeaderMapping::resolve(&h), HeaderMapping::resolve(&h));
    }

    #[test]
    fn blank_header_row_leaves_everything_unresolved() {
        let h = header(&["", "", "", "", "", ""]);
        for _ in 0..2 {
            let m = HeaderMapping::resolve(&h);
            assert_eq!(m.unresolved().count(), Field::ALL.len());
            for field in Field::ALL {
                assert_eq!(m.column_for(field), field.fallback_index());
            }
        }
    }
}
