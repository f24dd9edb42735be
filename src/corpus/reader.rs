use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::record::RawRecord;
use crate::config::ColumnConfig;
use crate::metrics::ResearcherEntry;

/// Researcher list as read from file, before deduplication.
#[derive(Debug, Clone, Default)]
pub struct ResearcherList {
    /// Header of the first column (the researcher ID).
    pub id_column: String,
    /// Headers of the remaining columns, carried through to the report.
    pub passthrough_headers: Vec<String>,
    pub entries: Vec<ResearcherEntry>,
    /// Rows whose first column was not an integer.
    pub skipped: usize,
}

/// Expand corpus arguments (paths or glob patterns) into a sorted file list.
///
/// A plain path that does not exist is an error; a pattern matching nothing
/// is an error too, so a typo never silently yields an empty corpus.
pub fn expand_corpus_paths(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let is_pattern = pattern.contains(|c: char| matches!(c, '*' | '?' | '['));
        if !is_pattern {
            let path = PathBuf::from(pattern);
            if !path.exists() {
                bail!("Corpus file not found: {}", path.display());
            }
            paths.push(path);
            continue;
        }

        let mut matched: Vec<PathBuf> = glob::glob(pattern)
            .with_context(|| format!("Invalid corpus pattern '{}'", pattern))?
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file())
            .collect();
        if matched.is_empty() {
            bail!("No corpus files match '{}'", pattern);
        }
        matched.sort();
        paths.extend(matched);
    }
    let mut seen = HashSet::new();
    paths.retain(|path| seen.insert(path.clone()));
    Ok(paths)
}

/// Read and concatenate every corpus file, in the given order.
pub fn read_corpus(paths: &[PathBuf], columns: &ColumnConfig) -> Result<Vec<RawRecord>> {
    let mut records = Vec::new();
    for path in paths {
        let file_records = read_corpus_file(path, columns)?;
        debug!(path = %path.display(), records = file_records.len(), "read corpus file");
        records.extend(file_records);
    }
    Ok(records)
}

pub fn read_corpus_file(path: &Path, columns: &ColumnConfig) -> Result<Vec<RawRecord>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open corpus file at {}", path.display()))?;
    read_corpus_from(file, columns, &path.display().to_string())
}

/// Read corpus rows from any CSV source. `source` names it in error messages.
///
/// The author-ID, document-type and year columns must be present; the other
/// columns are optional.
pub fn read_corpus_from<R: Read>(reader: R, columns: &ColumnConfig, source: &str) -> Result<Vec<RawRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = csv_reader
        .byte_headers()
        .with_context(|| format!("Failed to read header of {}", source))?
        .iter()
        .map(|h| clean_header(&String::from_utf8_lossy(h)))
        .collect();

    let required = |name: &str| -> Result<usize> {
        match find_column(&headers, name) {
            Some(idx) => Ok(idx),
            None => bail!("{}: missing required column '{}'", source, name),
        }
    };
    let author_ids = required(&columns.author_ids)?;
    let document_type = required(&columns.document_type)?;
    let year = required(&columns.year)?;

    let title = find_column(&headers, &columns.title);
    let source_title = find_column(&headers, &columns.source_title);
    let eid = find_column(&headers, &columns.eid);
    let authors = find_column(&headers, &columns.authors);
    let author_full_names = find_column(&headers, &columns.author_full_names);

    let mut records = Vec::new();
    for (line, row) in csv_reader.byte_records().enumerate() {
        let row = row.with_context(|| format!("{}: malformed CSV at record {}", source, line + 1))?;
        let cell = |idx: Option<usize>| idx.map(|i| field(&row, i));
        records.push(RawRecord {
            author_ids: cell(Some(author_ids)),
            document_type: cell(Some(document_type)),
            year: cell(Some(year)),
            title: cell(title),
            source_title: cell(source_title),
            eid: cell(eid),
            authors: cell(authors),
            author_full_names: cell(author_full_names),
        });
    }
    Ok(records)
}

pub fn read_researchers(path: &Path) -> Result<ResearcherList> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open researcher file at {}", path.display()))?;
    read_researchers_from(file, &path.display().to_string())
}

/// Read a researcher list: the first column holds the ID, the rest pass through.
pub fn read_researchers_from<R: Read>(reader: R, source: &str) -> Result<ResearcherList> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = csv_reader
        .byte_headers()
        .with_context(|| format!("Failed to read header of {}", source))?
        .iter()
        .map(|h| clean_header(&String::from_utf8_lossy(h)))
        .collect();

    let Some((id_column, passthrough_headers)) = headers.split_first() else {
        bail!("{}: researcher file has no columns", source);
    };

    let mut list = ResearcherList {
        id_column: id_column.clone(),
        passthrough_headers: passthrough_headers.to_vec(),
        ..Default::default()
    };

    for (line, row) in csv_reader.byte_records().enumerate() {
        let row = row.with_context(|| format!("{}: malformed CSV at record {}", source, line + 1))?;
        let raw_id = field(&row, 0);
        let raw_id = raw_id.trim();
        match raw_id.parse::<u64>() {
            Ok(id) => {
                let passthrough = (1..headers.len()).map(|i| field(&row, i)).collect();
                list.entries.push(ResearcherEntry { id, passthrough });
            }
            Err(_) => {
                warn!(record = line + 1, value = raw_id, "skipping researcher row without an integer ID");
                list.skipped += 1;
            }
        }
    }
    Ok(list)
}

// Non-UTF-8 bytes (Latin-1 titles in older exports) become U+FFFD instead of failing the row.
fn field(row: &csv::ByteRecord, idx: usize) -> String {
    row.get(idx)
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        .unwrap_or_default()
}

// Excel-exported CSVs start with a byte-order mark glued to the first header.
fn clean_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_string()
}

fn find_column(headers: &[String], name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .or_else(|| headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SCOPUS_SAMPLE: &str = "\u{feff}Authors,Author full names,Author(s) ID,Title,Year,Source title,Document Type,EID\n\
        \"Doe J.; Roe R.\",\"Doe, Jane (1); Roe, Rick (2)\",1;2,First paper,2020,Journal A,Article,2-s2.0-1\n\
        Roe R.,\"Roe, Rick (2)\",2,Second paper,2021,Journal B,Review,2-s2.0-2\n";

    #[test]
    fn test_read_scopus_export() {
        let records = read_corpus_from(SCOPUS_SAMPLE.as_bytes(), &ColumnConfig::default(), "sample").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].author_ids.as_deref(), Some("1;2"));
        assert_eq!(records[0].authors.as_deref(), Some("Doe J.; Roe R."));
        assert_eq!(records[0].eid.as_deref(), Some("2-s2.0-1"));
        assert_eq!(records[1].document_type.as_deref(), Some("Review"));
        assert_eq!(records[1].source_title.as_deref(), Some("Journal B"));
    }

    #[test]
    fn test_missing_required_column_is_fatal() {
        let csv = "Author(s) ID,Title,Document Type\n1;2,Paper,Article\n";
        let err = read_corpus_from(csv.as_bytes(), &ColumnConfig::default(), "broken.csv").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("broken.csv"));
        assert!(message.contains("'Year'"));
    }

    #[test]
    fn test_optional_columns_absent() {
        let csv = "Author(s) ID,Year,Document Type\n1;2,2020,Article\n";
        let records = read_corpus_from(csv.as_bytes(), &ColumnConfig::default(), "minimal").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, None);
        assert_eq!(records[0].eid, None);
    }

    #[test]
    fn test_custom_column_names() {
        let columns = ColumnConfig {
            author_ids: "ids".to_string(),
            document_type: "kind".to_string(),
            year: "published".to_string(),
            ..Default::default()
        };
        let csv = "ids,kind,published\n7|8,Article,1999\n";
        let records = read_corpus_from(csv.as_bytes(), &columns, "custom").unwrap();
        assert_eq!(records[0].author_ids.as_deref(), Some("7|8"));
        assert_eq!(records[0].year.as_deref(), Some("1999"));
    }

    #[test]
    fn test_column_match_falls_back_to_case_insensitive() {
        let csv = "author(s) id,YEAR,document type\n1,2020,Article\n";
        let records = read_corpus_from(csv.as_bytes(), &ColumnConfig::default(), "cased").unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_short_row_yields_empty_cells() {
        let csv = "Author(s) ID,Year,Document Type\n1;2,2020\n";
        let records = read_corpus_from(csv.as_bytes(), &ColumnConfig::default(), "short").unwrap();
        assert_eq!(records[0].document_type.as_deref(), Some(""));
    }

    #[test]
    fn test_invalid_utf8_field_keeps_every_row() {
        let mut csv = b"Author(s) ID,Title,Year,Document Type\n1,First,2020,Article\n2,Caf".to_vec();
        csv.extend_from_slice(&[0xE9]);
        csv.extend_from_slice(b" paper,2021,Article\n3,Third,2022,Review\n");

        let records = read_corpus_from(csv.as_slice(), &ColumnConfig::default(), "latin1.csv").unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].title.as_deref(), Some("Caf\u{fffd} paper"));
        assert_eq!(records[1].author_ids.as_deref(), Some("2"));
        assert_eq!(records[2].author_ids.as_deref(), Some("3"));
    }

    #[test]
    fn test_invalid_utf8_researcher_name() {
        let mut csv = b"ID,Name\n111,Ren".to_vec();
        csv.extend_from_slice(&[0xE9]);
        csv.extend_from_slice(b"e\n222,Ada\n");

        let list = read_researchers_from(csv.as_slice(), "researchers").unwrap();
        assert_eq!(list.entries.len(), 2);
        assert_eq!(list.entries[0].passthrough, vec!["Ren\u{fffd}e"]);
        assert_eq!(list.entries[1].id, 222);
    }

    #[test]
    fn test_read_researchers_with_passthrough() {
        let csv = "Scopus ID,Name,Department\n111,Ada,Math\nnot-an-id,Bob,CS\n222,Cy,Bio\n";
        let list = read_researchers_from(csv.as_bytes(), "researchers").unwrap();
        assert_eq!(list.id_column, "Scopus ID");
        assert_eq!(list.passthrough_headers, vec!["Name", "Department"]);
        assert_eq!(list.entries.len(), 2);
        assert_eq!(list.entries[0].id, 111);
        assert_eq!(list.entries[0].passthrough, vec!["Ada", "Math"]);
        assert_eq!(list.skipped, 1);
    }

    #[test]
    fn test_expand_corpus_paths_glob_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.csv", "a.csv", "notes.txt"] {
            let mut f = File::create(dir.path().join(name)).unwrap();
            writeln!(f, "x").unwrap();
        }
        let pattern = dir.path().join("*.csv").display().to_string();
        let paths = expand_corpus_paths(&[pattern]).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("a.csv"));
        assert!(paths[1].ends_with("b.csv"));
    }

    #[test]
    fn test_expand_corpus_paths_drops_repeats() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.csv", "b.csv"] {
            std::fs::write(dir.path().join(name), "x\n").unwrap();
        }
        let plain = dir.path().join("a.csv").display().to_string();
        let pattern = dir.path().join("*.csv").display().to_string();
        let paths = expand_corpus_paths(&[plain, pattern]).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("a.csv"));
        assert!(paths[1].ends_with("b.csv"));
    }

    #[test]
    fn test_expand_corpus_paths_missing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.csv").display().to_string();
        assert!(expand_corpus_paths(&[missing]).is_err());
        let pattern = dir.path().join("*.csv").display().to_string();
        assert!(expand_corpus_paths(&[pattern]).is_err());
    }

    #[test]
    fn test_read_corpus_concatenates_files() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("part1.csv");
        let second = dir.path().join("part2.csv");
        std::fs::write(&first, "Author(s) ID,Year,Document Type\n1,2020,Article\n").unwrap();
        std::fs::write(&second, "Author(s) ID,Year,Document Type\n2,2021,Review\n3,2022,Article\n").unwrap();

        let records = read_corpus(&[first, second], &ColumnConfig::default()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].author_ids.as_deref(), Some("3"));
    }
}
