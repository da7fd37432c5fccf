//! Group name input file.

use std::path::Path;

use crate::error::{CliError, CliResult};

/// Reads group URL names, one per line.
///
/// Lines are trimmed and blank lines skipped. A file without any name is an
/// error.
pub fn read_group_names(path: &Path) -> CliResult<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    let names = parse_group_names(&content);
    if names.is_empty() {
        return Err(CliError::Input(format!(
            "no group names found in {}",
            path.display()
        )));
    }
    Ok(names)
}

fn parse_group_names(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
