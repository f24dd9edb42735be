use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Write `contents` to `path` atomically: readers see either the old file or
/// the complete new one, never a partial write.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    file.write_all(contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    file.commit()
        .with_context(|| format!("Failed to save {}", path.display()))?;

    Ok(())
}

/// Print a rendered report to stdout, or write it to `path` when given.
pub fn emit(rendered: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            let mut contents = rendered.to_string();
            if !contents.is_empty() && !contents.ends_with('\n') {
                contents.push('\n');
            }
            write_atomic(path, contents.as_bytes())?;
            info!(path = %path.display(), bytes = contents.len(), "wrote report");
            Ok(())
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            write!(stdout, "{}", rendered).context("Failed to write to stdout")?;
            if !rendered.ends_with('\n') {
                writeln!(stdout).context("Failed to write to stdout")?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        write_atomic(&path, b"id,credit\n1,0.5\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "id,credit\n1,0.5\n");
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        std::fs::write(&path, "old contents that are longer").unwrap();
        write_atomic(&path, b"new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_emit_to_file_appends_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tsv");
        emit("a\tb", Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\tb\n");
    }

    #[test]
    fn test_write_atomic_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no").join("such").join("dir.json");
        assert!(write_atomic(&path, b"{}").is_err());
    }
}
