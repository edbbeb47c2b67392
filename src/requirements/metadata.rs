//! Installed-distribution lookup.
//!
//! Installers record every distribution they place on the search path as a
//! `<name>-<version>.dist-info` directory (holding `METADATA`) or, for
//! legacy installs, an `<name>-<version>.egg-info` directory (holding
//! `PKG-INFO`) or a bare `.egg-info` file in the same format. The `Version`
//! header of that record is the authoritative installed version.

use std::fs;
use std::path::{Path, PathBuf};

use super::requirement::normalize_name;

/// An installed distribution record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    /// The normalized distribution name.
    pub name: String,
    /// The recorded version.
    pub version: String,
    /// The `.dist-info` or `.egg-info` entry the version was read from.
    pub record: PathBuf,
}

/// Find the first installed distribution named `normalized_name`.
///
/// Directories are searched in order; within a directory, records are
/// visited in file-name order. Records without a readable `Version` header
/// are skipped.
pub fn find_distribution(search_path: &[PathBuf], normalized_name: &str) -> Option<Distribution> {
    search_path
        .iter()
        .find_map(|dir| find_in_dir(dir, normalized_name))
}

fn find_in_dir(dir: &Path, normalized_name: &str) -> Option<Distribution> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("Skipping search path entry {}: {}", dir.display(), e);
            return None;
        }
    };

    let mut records: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| record_matches(path, normalized_name))
        .collect();
    records.sort();

    records.into_iter().find_map(|record| {
        let version = read_record_version(&record);
        if version.is_none() {
            tracing::debug!("No Version header in {}", record.display());
        }
        version.map(|version| Distribution {
            name: normalized_name.to_string(),
            version,
            record,
        })
    })
}

/// Whether a directory entry is a distribution record for `normalized_name`.
fn record_matches(path: &Path, normalized_name: &str) -> bool {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let stem = file_name
        .strip_suffix(".dist-info")
        .or_else(|| file_name.strip_suffix(".egg-info"));
    let Some(stem) = stem else {
        return false;
    };
    // `-` is escaped to `_` in record names, so the first `-` ends the name.
    let dist_name = stem.split('-').next().unwrap_or(stem);
    normalize_name(dist_name) == normalized_name
}

/// Read the `Version` header of a record.
fn read_record_version(record: &Path) -> Option<String> {
    let metadata_file = if record.is_dir() {
        ["METADATA", "PKG-INFO"]
            .iter()
            .map(|name| record.join(name))
            .find(|path| path.is_file())?
    } else {
        record.to_path_buf()
    };

    let content = fs::read_to_string(&metadata_file).ok()?;
    parse_version_header(&content)
}

/// Extract the `Version` header from RFC 822 style metadata.
///
/// Only the header block (up to the first blank line) is searched; the
/// body may be a README that mentions anything.
pub fn parse_version_header(content: &str) -> Option<String> {
    content
        .lines()
        .take_while(|line| !line.trim().is_empty())
        .filter_map(|line| line.split_once(':'))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("version"))
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
