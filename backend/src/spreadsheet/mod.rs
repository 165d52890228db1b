//! Turns an uploaded spreadsheet export into [`ExcelRow`]s.
//!
//! Uploads are delimited text (`,` `;` tab or `|`, picked from the header line). Header labels
//! are matched ignoring case, accents and repeated whitespace, so "Grupo de Veículos" and
//! "grupo  de veiculos" name the same column.

use crate::error::SpreadsheetError;
use common::model::spreadsheet::ExcelRow;
use csv::ReaderBuilder;
use log::warn;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Header labels for the three logical fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    pub chassi: &'static str,
    pub cliente: &'static str,
    pub grupo: &'static str,
}

/// Template used for production runs.
pub const PRODUCTION_COLUMNS: ColumnMapping = ColumnMapping {
    chassi: "Chassi",
    cliente: "Cliente",
    grupo: "Grupo",
};

/// Template used for dry runs; only the group header differs.
pub const TEST_COLUMNS: ColumnMapping = ColumnMapping {
    chassi: "Chassi",
    cliente: "Cliente",
    grupo: "Grupo de Veículos",
};

pub fn read_rows(path: &Path, mapping: &ColumnMapping) -> Result<Vec<ExcelRow>, SpreadsheetError> {
    let bytes = fs::read(path)?;
    parse_rows(&String::from_utf8_lossy(&bytes), mapping)
}

/// An empty file gives no rows. A mapped column missing from the header reads as empty cells,
/// which leaves the rejection to the matcher.
pub fn parse_rows(content: &str, mapping: &ColumnMapping) -> Result<Vec<ExcelRow>, SpreadsheetError> {
    let content = content.trim_start_matches('\u{feff}');
    let Some(header_line) = content.lines().find(|l| !l.trim().is_empty()) else {
        return Ok(Vec::new());
    };
    let delimiter = detect_delimiter(header_line);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let index: HashMap<String, usize> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| (normalize_header(h), i))
        .collect();

    let column = |label: &str| {
        let found = index.get(&normalize_header(label)).copied();
        if found.is_none() {
            warn!("Column '{}' not found in spreadsheet header", label);
        }
        found
    };
    let chassi_col = column(mapping.chassi);
    let cliente_col = column(mapping.cliente);
    let grupo_col = column(mapping.grupo);

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let cell = |col: Option<usize>| {
            col.and_then(|c| record.get(c))
                .map(str::trim)
                .unwrap_or_default()
        };

        let chassi = cell(chassi_col).to_string();
        let cliente = cell(cliente_col).to_lowercase();
        let grupo = Some(cell(grupo_col).to_lowercase()).filter(|g| !g.is_empty());

        if chassi.is_empty() && cliente.is_empty() && grupo.is_none() {
            continue;
        }

        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(i + 2);
        rows.push(ExcelRow {
            line,
            chassi,
            cliente,
            grupo,
        });
    }

    Ok(rows)
}

/// The candidate separator appearing most often in the header line wins; ties go to the
/// earlier candidate, so a header without any separator reads as `,`.
pub fn detect_delimiter(header_line: &str) -> char {
    let mut best = (',', 0);
    for candidate in [',', ';', '\t', '|'] {
        let count = header_line.matches(candidate).count();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}

/// Lower-case, accent-free, single-spaced.
pub fn normalize_header(label: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("static regex"));

    let folded: String = label
        .trim()
        .trim_start_matches('\u{feff}')
        .to_lowercase()
        .chars()
        .map(fold_accent)
        .collect();
    whitespace.replace_all(folded.trim(), " ").into_owned()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn headers_match_ignoring_case_accents_and_spacing() {
        assert_eq!(normalize_header("  Grupo de  Veículos "), "grupo de veiculos");
        assert_eq!(normalize_header("\u{feff}CHASSI"), "chassi");
    }

    #[test]
    fn delimiter_is_detected_from_header() {
        assert_eq!(detect_delimiter("Chassi;Cliente;Grupo"), ';');
        assert_eq!(detect_delimiter("Chassi\tCliente"), '\t');
        assert_eq!(detect_delimiter("Chassi"), ',');
    }

    #[test]
    fn rows_are_normalized_and_numbered_by_sheet_line() {
        let content = "Chassi;CLIENTE;Grupo\n VIN1 ; ACME ; Vans \nVIN2;Acme;\n;;\n;acme;x\n";
        let rows = parse_rows(content, &PRODUCTION_COLUMNS).unwrap();

        assert_eq!(
            rows,
            vec![
                ExcelRow {
                    line: 2,
                    chassi: "VIN1".to_string(),
                    cliente: "acme".to_string(),
                    grupo: Some("vans".to_string()),
                },
                ExcelRow {
                    line: 3,
                    chassi: "VIN2".to_string(),
                    cliente: "acme".to_string(),
                    grupo: None,
                },
                ExcelRow {
                    line: 5,
                    chassi: String::new(),
                    cliente: "acme".to_string(),
                    grupo: Some("x".to_string()),
                },
            ]
        );
    }

    #[test]
    fn both_group_headers_feed_the_same_field() {
        let production = parse_rows("Chassi,Cliente,Grupo\nV1,a,g\n", &PRODUCTION_COLUMNS).unwrap();
        let test = parse_rows(
            "Chassi,Cliente,Grupo de Veiculos\nV1,a,g\n",
            &TEST_COLUMNS,
        )
        .unwrap();
        assert_eq!(production, test);
    }

    #[test]
    fn group_column_is_optional() {
        let rows = parse_rows("Chassi,Cliente\nV1,Acme\n", &PRODUCTION_COLUMNS).unwrap();
        assert_eq!(rows[0].grupo, None);
    }

    #[test]
    fn ties_and_separator_free_headers_fall_back_to_comma() {
        assert_eq!(detect_delimiter("Chassi,Cliente;Grupo"), ',');
        assert_eq!(detect_delimiter("Chassi|Cliente;Grupo"), ';');
        assert_eq!(detect_delimiter(""), ',');
    }

    #[test]
    fn missing_client_column_reads_as_empty_cells() {
        let rows = parse_rows("Chassi,Grupo\nV1,g\n", &PRODUCTION_COLUMNS).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].chassi, "V1");
        assert_eq!(rows[0].cliente, "");
    }

    #[test]
    fn empty_or_header_only_files_have_no_rows() {
        assert!(parse_rows("", &PRODUCTION_COLUMNS).unwrap().is_empty());
        assert!(parse_rows("\n\n", &PRODUCTION_COLUMNS).unwrap().is_empty());
        assert!(parse_rows("Chassi,Cliente,Grupo\n", &PRODUCTION_COLUMNS).unwrap().is_empty());
    }

    #[test]
    fn reads_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "Chassi,Cliente,Grupo\r\nVIN9,Acme,\r\n").unwrap();

        let rows = read_rows(file.path(), &PRODUCTION_COLUMNS).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].chassi, "VIN9");
    }
}
