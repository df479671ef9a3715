//! CSV exchange format for inventory records.
//!
//! Files carry a header row followed by one row per record with the columns
//! `id, name, code, tags, stock`. Text columns are double-quoted on export;
//! import accepts quoted or bare fields and skips rows it cannot use instead
//! of failing the whole file.

use std::path::Path;

use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::tags::{format_tags, parse_tags};
use crate::{InventoryError, Record, RecordId, Result, Stock, TextNormalizer, UNKNOWN_STOCK};

/// Column labels written on export.
pub const HEADER: [&str; 5] = ["ID", "Ürün Adı", "Ürün Kodu", "Kategori", "Stok"];

/// Minimum number of fields a data row needs to be considered.
const MIN_FIELDS: usize = HEADER.len();

const TEMPLATE_ROWS: [[&str; 5]; 3] = [
    ["AB001", "ÖRNEK ÜRÜN 1", "PRD001", "ELEKTRONIK TEST", "10"],
    ["CD002", "ÖRNEK ÜRÜN 2", "PRD002", "MEKANIK DIŞLI", "5"],
    ["EF003", "ÖRNEK ÜRÜN 3", "PRD003", "ELEKTRONIK IC", "?"],
];

/// Result of decoding a CSV document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeOutcome {
    /// Rows that produced a usable record, in file order.
    pub records: Vec<Record>,
    /// Number of accepted rows.
    pub success_count: usize,
    /// Number of rows that were skipped.
    pub error_count: usize,
}

impl DecodeOutcome {
    /// True when at least one record was accepted.
    pub fn is_valid(&self) -> bool {
        !self.records.is_empty()
    }
}

/// Summary of a loose header check on a CSV document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatReport {
    /// Header cells with quotes removed.
    pub headers: Vec<String>,
    /// Number of non-blank lines after the header.
    pub row_count: usize,
}

/// Serializes records into CSV text.
///
/// Name, code and tags are wrapped in double quotes; id and stock are written
/// bare. Rows are separated by `\n` with no trailing newline.
pub fn encode(records: &[Record]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(HEADER.join(","));
    for record in records {
        lines.push(format!(
            "{},\"{}\",\"{}\",\"{}\",{}",
            record.id,
            record.name,
            record.code,
            format_tags(&record.tags),
            record.stock
        ));
    }
    lines.join("\n")
}

/// Parses CSV text into records.
///
/// `next_id` supplies an id for rows whose id column is blank. Rows with fewer
/// than five fields, or whose name or code is empty after normalization, are
/// counted in `error_count` and skipped.
///
/// # Errors
///
/// Returns [`InventoryError::CsvFormat`] when the text does not contain a
/// header line and at least one data line.
pub fn decode(text: &str, mut next_id: impl FnMut() -> RecordId) -> Result<DecodeOutcome> {
    let lines = non_blank_lines(text);
    if lines.len() < 2 {
        return Err(InventoryError::CsvFormat { lines: lines.len() });
    }

    let mut outcome = DecodeOutcome::default();

    for (index, line) in lines.iter().enumerate().skip(1) {
        let line_no = index + 1;
        let fields = split_line(line);
        if fields.len() < MIN_FIELDS {
            warn!(line = line_no, fields = fields.len(), "skipping CSV row with too few fields");
            outcome.error_count += 1;
            continue;
        }

        let name = TextNormalizer::normalize(&fields[1]);
        let code = TextNormalizer::normalize(&fields[2]);
        let tags = parse_tags(&fields[3]);
        let stock_text = if fields[4].is_empty() {
            UNKNOWN_STOCK
        } else {
            fields[4].as_str()
        };
        let stock = Stock::coerce(stock_text);

        if name.is_empty() || code.is_empty() {
            warn!(line = line_no, "skipping CSV row with empty name or code");
            outcome.error_count += 1;
            continue;
        }

        let id = if fields[0].is_empty() {
            next_id()
        } else {
            RecordId::new(fields[0].as_str())
        };
        outcome.records.push(Record::new(id, name, code, tags, stock));
        outcome.success_count += 1;
    }

    debug!(
        accepted = outcome.success_count,
        skipped = outcome.error_count,
        "decoded CSV"
    );
    Ok(outcome)
}

/// Splits one CSV line into trimmed fields.
///
/// A double quote toggles quoted mode and is dropped; commas separate fields
/// only outside quotes. There is no escaping of quotes.
///
/// # Examples
///
/// ```
/// use stok::csv::split_line;
///
/// assert_eq!(split_line(r#"a,"b,c",d"#), vec!["a", "b,c", "d"]);
/// assert_eq!(split_line(""), vec![""]);
/// ```
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Checks that text looks like an inventory CSV before importing it.
///
/// Header matching is loose: the file passes if any header cell contains any
/// expected column label, ignoring case.
///
/// # Errors
///
/// Returns [`InventoryError::CsvFormat`] for fewer than two non-blank lines and
/// [`InventoryError::MissingColumns`] when no expected label appears.
pub fn validate_format(text: &str) -> Result<FormatReport> {
    let lines = non_blank_lines(text);
    if lines.len() < 2 {
        return Err(InventoryError::CsvFormat { lines: lines.len() });
    }

    let headers: Vec<String> = lines[0]
        .split(',')
        .map(|h| h.trim().replace('"', ""))
        .collect();

    let has_expected_column = HEADER.iter().any(|expected| {
        let expected = expected.to_lowercase();
        headers
            .iter()
            .any(|header| header.to_lowercase().contains(&expected))
    });

    if !has_expected_column {
        return Err(InventoryError::MissingColumns {
            expected: HEADER.join(", "),
        });
    }

    Ok(FormatReport {
        headers,
        row_count: lines.len() - 1,
    })
}

/// Sample file users can fill in and import.
pub fn template() -> String {
    let mut lines = vec![HEADER.join(",")];
    for row in TEMPLATE_ROWS {
        let quoted: Vec<String> = row.iter().map(|cell| format!("\"{cell}\"")).collect();
        lines.push(quoted.join(","));
    }
    lines.join("\n")
}

/// File name for an export taken at `now`, e.g. `stock_takip_2025-01-22_14-30.csv`.
pub fn export_file_name(now: OffsetDateTime) -> String {
    format!(
        "stock_takip_{:04}-{:02}-{:02}_{:02}-{:02}.csv",
        now.year(),
        u8::from(now.month()),
        now.day(),
        now.hour(),
        now.minute()
    )
}

/// Reads an import file as UTF-8 text.
///
/// # Errors
///
/// Returns [`InventoryError::NotCsv`] when the path does not end in `.csv`
/// (any case), or an I/O error if reading fails.
pub fn read_csv_file(path: &Path) -> Result<String> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(InventoryError::NotCsv(path.to_path_buf()));
    }

    let text = std::fs::read_to_string(path)?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

fn non_blank_lines(text: &str) -> Vec<&str> {
    text.split('\n').filter(|line| !line.trim().is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn fixed_id() -> impl FnMut() -> RecordId {
        let mut n = 0;
        move || {
            n += 1;
            RecordId::new(format!("GEN{n:03}"))
        }
    }

    fn record(id: &str, name: &str, code: &str, tags: &[&str], stock: Stock) -> Record {
        Record::new(
            RecordId::new(id),
            name,
            code,
            tags.iter().map(|t| t.to_string()).collect(),
            stock,
        )
    }

    #[test]
    fn test_split_plain_fields() {
        assert_eq!(split_line("a,b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_quoted_fields() {
        assert_eq!(
            split_line(r#""quoted value",normal,123"#),
            vec!["quoted value", "normal", "123"]
        );
        assert_eq!(split_line(r#"a,"b,c",d"#), vec!["a", "b,c", "d"]);
    }

    #[test]
    fn test_split_empty_line_yields_one_empty_field() {
        assert_eq!(split_line(""), vec![""]);
    }

    #[test]
    fn test_split_trims_fields() {
        assert_eq!(split_line(" a , b ,c\r"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_encode_quotes_text_columns() {
        let records = vec![
            record("AB001", "TEST URUN", "PRD-001", &["ELEKTRONIK", "RELAY"], Stock::Count(10)),
            record("CD002", "VIDA", "M3", &[], Stock::Unknown),
        ];

        let csv = encode(&records);

        assert_eq!(
            csv,
            "ID,Ürün Adı,Ürün Kodu,Kategori,Stok\n\
             AB001,\"TEST URUN\",\"PRD-001\",\"ELEKTRONIK RELAY\",10\n\
             CD002,\"VIDA\",\"M3\",\"\",?"
        );
    }

    #[test]
    fn test_encode_empty_list_is_header_only() {
        assert_eq!(encode(&[]), "ID,Ürün Adı,Ürün Kodu,Kategori,Stok");
    }

    #[test]
    fn test_decode_normalizes_fields() {
        let text = "ID,Name,Code,Tag,Stock\nAB001,\"Test Ürün\",\"PRD-001\",\"elektronik relay\",10";

        let outcome = decode(text, fixed_id()).unwrap();

        assert_eq!(outcome.success_count, 1);
        assert_eq!(outcome.error_count, 0);
        assert!(outcome.is_valid());
        let r = &outcome.records[0];
        assert_eq!(r.id.as_str(), "AB001");
        assert_eq!(r.name, "TEST URUN");
        assert_eq!(r.code, "PRD-001");
        assert_eq!(r.tags, vec!["ELEKTRONIK", "RELAY"]);
        assert_eq!(r.stock, Stock::Count(10));
    }

    #[test]
    fn test_decode_header_only_is_format_error() {
        let err = decode("ID,Name,Code,Tag,Stock\n", fixed_id()).unwrap_err();
        assert!(matches!(err, InventoryError::CsvFormat { lines: 1 }));
    }

    #[test]
    fn test_decode_empty_text_is_format_error() {
        let err = decode("\n  \n", fixed_id()).unwrap_err();
        assert!(matches!(err, InventoryError::CsvFormat { lines: 0 }));
    }

    #[test]
    fn test_decode_skips_row_with_empty_name() {
        let text = "h\nAB001,\"\",\"PRD\",\"\",1\nCD002,\"VIDA\",\"M3\",\"\",2";

        let outcome = decode(text, fixed_id()).unwrap();

        assert_eq!(outcome.success_count, 1);
        assert_eq!(outcome.error_count, 1);
        assert!(outcome.is_valid());
        assert_eq!(outcome.records[0].id.as_str(), "CD002");
    }

    #[test]
    fn test_decode_skips_short_rows() {
        let text = "h\nAB001,VIDA,M3\nCD002,SOMUN,M4,,3";

        let outcome = decode(text, fixed_id()).unwrap();

        assert_eq!(outcome.success_count, 1);
        assert_eq!(outcome.error_count, 1);
    }

    #[test]
    fn test_decode_all_rows_bad_is_not_valid() {
        let outcome = decode("h\n,,,,\nx", fixed_id()).unwrap();

        assert_eq!(outcome.success_count, 0);
        assert_eq!(outcome.error_count, 2);
        assert!(!outcome.is_valid());
    }

    #[test]
    fn test_decode_blank_id_gets_generated_id() {
        let outcome = decode("h\n,VIDA,M3,,5\n,SOMUN,M4,,", fixed_id()).unwrap();

        assert_eq!(outcome.records[0].id.as_str(), "GEN001");
        assert_eq!(outcome.records[1].id.as_str(), "GEN002");
    }

    #[test]
    fn test_decode_blank_stock_is_unknown() {
        let outcome = decode("h\nA1,VIDA,M3,,", fixed_id()).unwrap();
        assert_eq!(outcome.records[0].stock, Stock::Unknown);
    }

    #[test]
    fn test_decode_ignores_blank_lines_and_crlf() {
        let text = "h\r\n\r\nA1,\"VIDA\",\"M3\",\"MEKANIK\",4\r\n\r\n";

        let outcome = decode(text, fixed_id()).unwrap();

        assert_eq!(outcome.success_count, 1);
        assert_eq!(outcome.records[0].stock, Stock::Count(4));
    }

    #[test]
    fn test_decode_keeps_extra_columns_out() {
        let outcome = decode("h\nA1,VIDA,M3,X,4,extra,columns", fixed_id()).unwrap();
        assert_eq!(outcome.records[0].tags, vec!["X"]);
        assert_eq!(outcome.records[0].stock, Stock::Count(4));
    }

    #[test]
    fn test_encode_then_decode_preserves_values() {
        let records = vec![
            record("AB001", "TEST URUN", "PRD-001", &["ELEKTRONIK", "RELAY"], Stock::Count(10)),
            record("CD002", "VIDA, M3", "M3", &[], Stock::Unknown),
            record("EF003", "KONDANSATOR", "C-100", &["ELEKTRONIK"], Stock::Count(0)),
        ];

        let outcome = decode(&encode(&records), fixed_id()).unwrap();

        assert_eq!(outcome.records, records);
        assert_eq!(outcome.error_count, 0);
    }

    #[test]
    fn test_template_decodes_cleanly() {
        let outcome = decode(&template(), fixed_id()).unwrap();

        assert_eq!(outcome.success_count, 3);
        assert_eq!(outcome.records[0].name, "ORNEK URUN 1");
        assert_eq!(outcome.records[1].tags, vec!["MEKANIK", "DISLI"]);
        assert_eq!(outcome.records[2].stock, Stock::Unknown);
    }

    #[test]
    fn test_validate_format_accepts_known_headers() {
        let report = validate_format("\"ID\",\"Ürün Adı\"\na,b").unwrap();

        assert_eq!(report.headers, vec!["ID", "Ürün Adı"]);
        assert_eq!(report.row_count, 1);
    }

    #[test]
    fn test_validate_format_rejects_unknown_headers() {
        let err = validate_format("foo,bar\n1,2").unwrap_err();
        assert!(matches!(err, InventoryError::MissingColumns { .. }));
    }

    #[test]
    fn test_validate_format_requires_two_lines() {
        let err = validate_format("ID,Stok").unwrap_err();
        assert!(matches!(err, InventoryError::CsvFormat { lines: 1 }));
    }

    #[test]
    fn test_export_file_name() {
        let now = datetime!(2025-01-22 14:30:59 UTC);
        assert_eq!(export_file_name(now), "stock_takip_2025-01-22_14-30.csv");
    }

    #[test]
    fn test_read_csv_file_rejects_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");
        std::fs::write(&path, "h\na,b,c,d,e").unwrap();

        let err = read_csv_file(&path).unwrap_err();
        assert!(matches!(err, InventoryError::NotCsv(_)));
    }

    #[test]
    fn test_read_csv_file_strips_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("DATA.CSV");
        std::fs::write(&path, "\u{feff}ID,Stok\nA,1").unwrap();

        let text = read_csv_file(&path).unwrap();
        assert!(text.starts_with("ID"));
    }
}
