//! The `RECORD` file of an installed distribution.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use pipette_util::errors::PipetteError;

/// First column of every row: paths relative to the store root.
pub fn parse_record(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            if let Some(quoted) = line.strip_prefix('"') {
                // "a,b.py",sha256=...,12 with "" as an escaped quote
                let mut path = String::new();
                let mut chars = quoted.chars().peekable();
                while let Some(c) = chars.next() {
                    if c == '"' {
                        if chars.peek() == Some(&'"') {
                            chars.next();
                            path.push('"');
                        } else {
                            break;
                        }
                    } else {
                        path.push(c);
                    }
                }
                Some(path)
            } else {
                line.split(',').next().map(str::to_string)
            }
        })
        .filter(|path| !path.is_empty())
        .collect()
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Write `RECORD` into `dist_info` listing `files` (relative to `root`).
pub fn write_record(root: &Path, dist_info: &Path, files: &[PathBuf]) -> Result<(), PipetteError> {
    let record_path = dist_info.join("RECORD");
    let mut out = fs::File::create(&record_path)?;
    for file in files {
        if root.join(file) == record_path {
            continue;
        }
        let size = fs::metadata(root.join(file)).map(|m| m.len()).ok();
        let path = file.to_string_lossy().replace('\\', "/");
        match size {
            Some(size) => writeln!(out, "{},,{size}", csv_field(&path))?,
            None => writeln!(out, "{},,", csv_field(&path))?,
        }
    }
    if let Ok(rel) = record_path.strip_prefix(root) {
        writeln!(out, "{},,", csv_field(&rel.to_string_lossy().replace('\\', "/")))?;
    }
    Ok(())
}
