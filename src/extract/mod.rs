//! Dataset extraction: CSV files to typed records.
//!
//! Source files come from assorted exports, so encoding and delimiter are
//! auto-detected before parsing: `chardet` guesses the charset, the bytes
//! decode through `encoding_rs`, and the delimiter is sniffed from the
//! header line. Rows then deserialize into the typed records of
//! [`crate::models`], with blank / `NaN` cells normalized to absence at the
//! edge.
//!
//! A missing file, an empty file, or a header without the dataset's
//! required columns is a loader failure that aborts the whole run; no
//! partial extraction is modeled.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{ExtractError, ExtractResult};
use crate::models::{AssetRecord, EntityRecord, JoinRecord};

/// A parsed dataset with the detection metadata used to read it.
#[derive(Debug, Clone)]
pub struct Extraction<T> {
    pub records: Vec<T>,
    pub encoding: String,
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let (charset, _, _) = chardet::detect(bytes);

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the detected encoding.
pub fn decode_content(bytes: &[u8], encoding: &str) -> ExtractResult<String> {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => Ok(String::from_utf8_lossy(bytes).to_string()),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => {
            Ok(encoding_rs::ISO_8859_15.decode(bytes).0.to_string())
        }
        "windows-1252" | "cp1252" => Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.to_string()),
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(enc) => Ok(enc.decode(bytes).0.to_string()),
            None => Err(ExtractError::EncodingError(other.to_string())),
        },
    }
}

/// Detect the delimiter by counting candidates in the header line.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Extract asset records from a CSV file.
pub fn extract_assets(path: &Path) -> ExtractResult<Extraction<AssetRecord>> {
    extract_records(path, AssetRecord::COLUMNS)
}

/// Extract entity records from a CSV file.
pub fn extract_entities(path: &Path) -> ExtractResult<Extraction<EntityRecord>> {
    extract_records(path, EntityRecord::COLUMNS)
}

/// Extract join records from a CSV file.
pub fn extract_join(path: &Path) -> ExtractResult<Extraction<JoinRecord>> {
    extract_records(path, JoinRecord::COLUMNS)
}

/// Load and parse one dataset file with auto-detection, verifying that the
/// header carries every required column.
pub fn extract_records<T: DeserializeOwned>(
    path: &Path,
    required_columns: &[&str],
) -> ExtractResult<Extraction<T>> {
    if !path.exists() {
        return Err(ExtractError::NotFound(path.to_path_buf()));
    }

    let bytes = fs::read(path)?;
    if bytes.is_empty() {
        return Err(ExtractError::Empty(path.to_path_buf()));
    }

    let encoding = detect_encoding(&bytes);
    let content = decode_content(&bytes, &encoding)?;
    if content.trim().is_empty() {
        return Err(ExtractError::Empty(path.to_path_buf()));
    }

    let delimiter = detect_delimiter(&content);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let missing: Vec<String> = required_columns
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ExtractError::SchemaMismatch { path: path.to_path_buf(), missing });
    }

    let records = reader.deserialize().collect::<Result<Vec<T>, _>>()?;

    Ok(Extraction { records, encoding, delimiter })
}
