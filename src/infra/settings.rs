use log::{debug, warn};
use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Splits a comma-separated command-line list.
pub fn parse_pattern_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// One pattern per line; blank lines and `#` comments are skipped. Order is
/// preserved.
pub fn read_pattern_file(path: &Path) -> anyhow::Result<Vec<String>> {
    debug!("Reading exclude patterns from: {}", path.display());
    let file = fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);

    let mut patterns = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        patterns.push(trimmed.to_string());
    }

    debug!("Loaded {} patterns from {}", patterns.len(), path.display());
    Ok(patterns)
}

/// The exclusion setting: patterns given on the command line followed by the
/// contents of an optional pattern file. The file is read again on every call.
#[derive(Debug, Clone, Default)]
pub struct ExcludeSettings {
    inline: Vec<String>,
    file: Option<PathBuf>,
}

impl ExcludeSettings {
    pub fn new(inline: Vec<String>, file: Option<PathBuf>) -> Self {
        Self { inline, file }
    }

    pub fn current(&self) -> Vec<String> {
        let mut patterns = self.inline.clone();
        if let Some(path) = &self.file {
            match read_pattern_file(path) {
                Ok(from_file) => patterns.extend(from_file),
                Err(e) => warn!("Ignoring exclude file {}: {}", path.display(), e),
            }
        }
        patterns
    }
}
