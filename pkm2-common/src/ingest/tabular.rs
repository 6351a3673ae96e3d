//! Spreadsheet / CSV upload parsing
//!
//! Only the first column of the first sheet is consulted. A header row is
//! detected heuristically and skipped. Delimited-text uploads that fail the
//! primary decoder get a second chance via plain line splitting.

use std::fmt;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use tracing::{debug, warn};

use super::IngestError;

/// Header keywords checked against the first cell of the first row
const HEADER_KEYWORDS: [&str; 3] = ["smiles", "compound", "molecule"];

/// Keywords that disqualify a data cell even past row 0
const STRAY_HEADER_KEYWORDS: [&str; 2] = ["smiles", "compound"];

/// Header cells at or above this length are treated as data
const MAX_HEADER_LEN: usize = 50;

/// Minimum candidate length is `MIN_CANDIDATE_LEN + 1`
const MIN_CANDIDATE_LEN: usize = 2;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Accepted upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    /// `.csv` - decoded as text
    Delimited,
    /// `.xls` / `.xlsx` - decoded as a binary workbook
    Spreadsheet,
}

impl UploadKind {
    /// Classify an upload by its file name extension (case-insensitive)
    pub fn from_file_name(file_name: &str) -> Result<Self, IngestError> {
        let lower = file_name.trim().to_lowercase();
        if lower.ends_with(".csv") {
            Ok(UploadKind::Delimited)
        } else if lower.ends_with(".xls") || lower.ends_with(".xlsx") {
            Ok(UploadKind::Spreadsheet)
        } else {
            Err(IngestError::FileType {
                file_name: file_name.to_string(),
            })
        }
    }
}

/// Raw cell value, left as the decoder produced it
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Cell {
    fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Int(i) => write!(f, "{}", i),
            Cell::Float(x) => write!(f, "{}", x),
            Cell::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Int(i) => Cell::Int(*i),
            Data::Float(x) => Cell::Float(*x),
            Data::Bool(b) => Cell::Bool(*b),
            other => Cell::Text(other.to_string()),
        }
    }
}

type Row = Vec<Cell>;

/// Parse an uploaded file into candidate identifiers.
///
/// Rejects unsupported extensions before looking at the bytes. For `.csv`
/// uploads a failing primary decode falls back to line splitting on comma,
/// semicolon or tab.
pub fn parse_upload(file_name: &str, bytes: &[u8]) -> Result<Vec<String>, IngestError> {
    let kind = UploadKind::from_file_name(file_name)?;

    let primary = match kind {
        UploadKind::Delimited => read_delimited(bytes),
        UploadKind::Spreadsheet => read_workbook(bytes),
    };

    let rows = match primary {
        Ok(rows) => rows,
        Err(reason) if kind == UploadKind::Delimited => {
            warn!(file = %file_name, error = %reason, "Primary CSV decode failed, using line-split fallback");
            read_lines_fallback(bytes).map_err(|fallback| IngestError::FileParse {
                reason: format!("{}; fallback: {}", reason, fallback),
            })?
        }
        Err(reason) => return Err(IngestError::FileParse { reason }),
    };

    let candidates = extract_candidates(&rows);
    debug!(
        file = %file_name,
        rows = rows.len(),
        candidates = candidates.len(),
        "Parsed upload"
    );
    Ok(candidates)
}

/// Primary path for spreadsheets: first sheet, blank rows skipped
fn read_workbook(bytes: &[u8]) -> Result<Vec<Row>, String> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| format!("Unable to open the workbook: {}", e))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| "The workbook does not contain any worksheets".to_string())?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("Unable to read worksheet '{}': {}", sheet_name, e))?;

    // Ranges start at the first used cell; pad so index 0 is always column A
    let leading_columns = range.start().map(|(_, col)| col as usize).unwrap_or(0);

    Ok(range
        .rows()
        .map(|cells| {
            let mut row = vec![Cell::Empty; leading_columns];
            row.extend(cells.iter().map(Cell::from));
            row
        })
        .filter(|row| !is_blank_row(row))
        .collect())
}

/// Primary path for `.csv`: strict UTF-8 records with a sniffed delimiter
fn read_delimited(bytes: &[u8]) -> Result<Vec<Row>, String> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(bytes))
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| format!("Unable to read CSV rows: {}", e))?;
        let row: Row = record
            .iter()
            .map(|field| Cell::Text(field.to_string()))
            .collect();
        if !is_blank_row(&row) {
            rows.push(row);
        }
    }
    Ok(rows)
}

/// Fallback for malformed `.csv`: lossy decode, split lines on `,` `;` or tab
fn read_lines_fallback(bytes: &[u8]) -> Result<Vec<Row>, String> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = String::from_utf8_lossy(bytes);

    if text.contains('\0') {
        return Err("file content is binary, not text".to_string());
    }

    Ok(text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            line.split(|c: char| c == ',' || c == ';' || c == '\t')
                .map(|field| Cell::Text(field.to_string()))
                .collect()
        })
        .collect())
}

/// Pick the most frequent of tab / comma / semicolon in the first
/// non-blank line (comma wins ties and is the default)
fn detect_delimiter(bytes: &[u8]) -> u8 {
    let text = String::from_utf8_lossy(bytes);
    let Some(line) = text.lines().take(5).find(|line| !line.trim().is_empty()) else {
        return b',';
    };

    let mut best = (b',', line.matches(',').count());
    for delimiter in [b';', b'\t'] {
        let count = line.matches(delimiter as char).count();
        if count > best.1 {
            best = (delimiter, count);
        }
    }
    best.0
}

fn is_blank_row(row: &[Cell]) -> bool {
    row.iter().all(Cell::is_blank)
}

fn first_cell_text(row: &[Cell]) -> String {
    row.first().map(|cell| cell.to_string()).unwrap_or_default()
}

/// Whether row 0 looks like a column header
fn is_header_row(row: &[Cell]) -> bool {
    let first = first_cell_text(row).trim().to_lowercase();
    first.chars().count() < MAX_HEADER_LEN
        && HEADER_KEYWORDS.iter().any(|keyword| first.contains(keyword))
}

/// Apply header detection and first-column extraction to decoded rows
fn extract_candidates(rows: &[Row]) -> Vec<String> {
    let skip = usize::from(rows.len() > 1 && is_header_row(&rows[0]));

    rows.iter()
        .skip(skip)
        .map(|row| first_cell_text(row).trim().to_string())
        .filter(|value| value.chars().count() > MIN_CANDIDATE_LEN)
        .filter(|value| {
            let lower = value.to_lowercase();
            !STRAY_HEADER_KEYWORDS
                .iter()
                .any(|keyword| lower.contains(keyword))
        })
        .collect()
}
