use std::collections::HashMap;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use super::record::{FragmentRecord, parse_tags};
use crate::error::{AuditError, AuditResult};

/// Columns every index must declare, in any order.
pub const REQUIRED_COLUMNS: [&str; 5] = ["id", "name", "description", "tags", "fragment_file"];

/// Parsed index plus load-time integrity diagnostics.
#[derive(Debug, Clone, Default)]
pub struct LoadedIndex {
    /// Records in index order, duplicates included.
    pub records: Vec<FragmentRecord>,
    /// Ids declared by more than one row, in first-duplicate order.
    pub duplicate_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    id: usize,
    name: usize,
    description: usize,
    tags: usize,
    fragment_file: usize,
}

impl ColumnMap {
    fn from_header(header: &StringRecord) -> AuditResult<Self> {
        let positions: HashMap<&str, usize> = header
            .iter()
            .enumerate()
            .map(|(pos, name)| (name.trim(), pos))
            .collect();
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|column| !positions.contains_key(column))
            .collect();
        if let Some(first) = missing.first() {
            return Err(AuditError::malformed(
                0,
                first,
                format!("header is missing required column(s): {}", missing.join(", ")),
            ));
        }
        let at = |column: &str| positions.get(column).copied().unwrap_or_default();
        Ok(Self {
            id: at("id"),
            name: at("name"),
            description: at("description"),
            tags: at("tags"),
            fragment_file: at("fragment_file"),
        })
    }
}

fn field<'a>(row: &'a StringRecord, pos: usize) -> &'a str {
    row.get(pos).map_or("", str::trim)
}

fn required_field(row: &StringRecord, pos: usize, row_no: usize, column: &str) -> AuditResult<String> {
    let value = field(row, pos);
    if value.is_empty() {
        return Err(AuditError::malformed(row_no, column, "value must be non-empty"));
    }
    Ok(value.to_string())
}

/// Parse CSV index text into ordered fragment records.
///
/// Shape problems are fatal: a missing required header column, a row whose
/// width differs from the header, or an empty `id`/`description`/
/// `fragment_file`. Duplicate ids are not; they are collected in
/// [`LoadedIndex::duplicate_ids`] and every row is still returned.
///
/// # Errors
///
/// Returns [`AuditError::MalformedIndex`] naming the first offending row
/// (`0` for the header) and column.
pub fn load_index(text: &str) -> AuditResult<LoadedIndex> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let header = reader
        .headers()
        .map_err(|err| AuditError::malformed(0, "*", format!("unreadable header: {err}")))?
        .clone();
    let columns = ColumnMap::from_header(&header)?;
    let width = header.len();

    let mut loaded = LoadedIndex::default();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (offset, row) in reader.records().enumerate() {
        let row_no = offset + 1;
        let row = row.map_err(|err| AuditError::malformed(row_no, "*", err.to_string()))?;
        if row.len() != width {
            return Err(AuditError::malformed(
                row_no,
                "*",
                format!("expected {width} fields, found {}", row.len()),
            ));
        }

        let id = required_field(&row, columns.id, row_no, "id")?;
        let description = required_field(&row, columns.description, row_no, "description")?;
        let fragment_file = required_field(&row, columns.fragment_file, row_no, "fragment_file")?;

        let count = seen.entry(id.clone()).or_insert(0);
        *count += 1;
        if *count == 2 {
            log::warn!("duplicate fragment id '{id}' at index row {row_no}");
            loaded.duplicate_ids.push(id.clone());
        }

        loaded.records.push(FragmentRecord {
            id,
            name: field(&row, columns.name).to_string(),
            description,
            tags: parse_tags(field(&row, columns.tags)),
            fragment_file,
            row: row_no,
        });
    }

    log::debug!(
        "loaded {} index rows ({} duplicate ids)",
        loaded.records.len(),
        loaded.duplicate_ids.len()
    );
    Ok(loaded)
}

/// Read and parse an index file from disk.
///
/// # Errors
///
/// Returns [`AuditError::IndexRead`] when the file cannot be read, or any
/// error from [`load_index`].
pub fn load_index_file(path: &Path) -> AuditResult<LoadedIndex> {
    let text = std::fs::read_to_string(path).map_err(|source| AuditError::IndexRead {
        path: path.to_path_buf(),
        source,
    })?;
    load_index(&text)
}
