//! Reading and decoding schema scripts

use std::path::{Path, PathBuf};

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};
use walkdir::WalkDir;

use crate::error::SqlOrderError;

/// Read a schema script, or every `.sql` file under a directory.
///
/// Directory contents are read in path order and joined with a `GO` line
/// between files, so no statement can run from one file into the next.
/// `encoding` is an encoding label such as `utf-16le` or `windows-1252`;
/// when `None` the encoding of each file is detected.
pub fn read_schema(path: &Path, encoding: Option<&str>) -> Result<String, SqlOrderError> {
    let encoding = encoding.map(lookup_encoding).transpose()?;

    if !path.is_dir() {
        return read_schema_file(path, encoding);
    }

    let files = find_schema_files(path);
    if files.is_empty() {
        return Err(SqlOrderError::NoSchemaFiles {
            path: path.to_path_buf(),
        });
    }

    let mut combined = String::new();
    for file in &files {
        let content = read_schema_file(file, encoding)?;
        combined.push_str(&content);
        if !content.ends_with('\n') {
            combined.push('\n');
        }
        combined.push_str("GO\n");
    }

    tracing::debug!(files = files.len(), path = %path.display(), "read schema directory");
    Ok(combined)
}

/// All `.sql` files beneath `dir`, sorted by path
fn find_schema_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .map_or(false, |ext| ext.eq_ignore_ascii_case("sql"))
        })
        .collect();
    files.sort();
    files
}

fn lookup_encoding(label: &str) -> Result<&'static Encoding, SqlOrderError> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| SqlOrderError::UnknownEncoding {
        label: label.to_string(),
    })
}

fn read_schema_file(
    path: &Path,
    encoding: Option<&'static Encoding>,
) -> Result<String, SqlOrderError> {
    let bytes = std::fs::read(path).map_err(|e| SqlOrderError::SchemaReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let encoding = encoding.unwrap_or_else(|| detect_encoding(&bytes));
    let (decoded, had_errors) = encoding.decode_with_bom_removal(&bytes);
    if had_errors {
        return Err(SqlOrderError::SchemaDecodeError {
            path: path.to_path_buf(),
            encoding: encoding.name(),
        });
    }

    tracing::debug!(path = %path.display(), encoding = encoding.name(), "decoded schema file");
    Ok(decoded.into_owned())
}

/// Guess the encoding of a schema script.
///
/// A byte order mark wins. Without one, NUL bytes concentrated in every
/// other position mean UTF-16 (scripts exported from SQL Server Management Studio are
/// UTF-16LE), valid UTF-8 means UTF-8, and anything else is taken as
/// Windows-1252.
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }

    if bytes.len() >= 2 && bytes.len() % 2 == 0 {
        let pairs = bytes.len() / 2;
        let odd_nuls = bytes.iter().skip(1).step_by(2).filter(|&&b| b == 0).count();
        let even_nuls = bytes.iter().step_by(2).filter(|&&b| b == 0).count();
        // Code points such as U+0100 put a NUL on the other side too, so
        // only require one side to clearly dominate
        if odd_nuls * 4 > pairs && odd_nuls > even_nuls * 4 {
            return UTF_16LE;
        }
        if even_nuls * 4 > pairs && even_nuls > odd_nuls * 4 {
            return UTF_16BE;
        }
    }

    if std::str::from_utf8(bytes).is_ok() {
        UTF_8
    } else {
        WINDOWS_1252
    }
}
