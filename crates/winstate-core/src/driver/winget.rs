//! winget listing driver

use std::process::Command;

use super::PackageDriver;
use crate::{Error, Result};

const DRIVER_NAME: &str = "winget";

/// Reads installed packages from `winget list`
#[derive(Debug, Clone)]
pub struct WingetDriver {
    program: String,
}

impl Default for WingetDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl WingetDriver {
    pub fn new() -> Self {
        Self {
            program: DRIVER_NAME.to_string(),
        }
    }
}

impl PackageDriver for WingetDriver {
    fn name(&self) -> &str {
        DRIVER_NAME
    }

    fn installed_ids(&self) -> Result<Vec<String>> {
        let output = Command::new(&self.program)
            .args(["list", "--accept-source-agreements", "--disable-interactivity"])
            .output()
            .map_err(|e| Error::Driver {
                driver: DRIVER_NAME.to_string(),
                message: format!("failed to run {}: {}", self.program, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Driver {
                driver: DRIVER_NAME.to_string(),
                message: format!("list exited with {}: {}", output.status, stderr.trim()),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let ids = parse_winget_list(&stdout);
        tracing::debug!(count = ids.len(), "Queried installed winget packages");
        Ok(ids)
    }
}

/// Extract package ids from `winget list` table output.
///
/// The table is fixed-width: the `Id` header marks where the id column
/// starts and the `Version` header after it marks where it ends. Dash
/// separator rows and rows too short to reach the id column are ignored.
/// Progress spinner output before a carriage return is discarded.
pub fn parse_winget_list(output: &str) -> Vec<String> {
    let mut columns: Option<(usize, Option<usize>)> = None;
    let mut ids = Vec::new();

    for line in output.lines() {
        let line = line.rsplit('\r').next().unwrap_or(line);
        let chars: Vec<char> = line.chars().collect();

        let Some((id_start, id_end)) = columns else {
            columns = header_columns(&chars);
            continue;
        };

        if is_separator(line) || chars.len() <= id_start {
            continue;
        }

        let end = id_end.unwrap_or(chars.len()).min(chars.len());
        if end <= id_start {
            continue;
        }
        let id: String = chars[id_start..end].iter().collect();
        if let Some(id) = id.split_whitespace().next() {
            ids.push(id.to_string());
        }
    }

    ids
}

fn header_columns(chars: &[char]) -> Option<(usize, Option<usize>)> {
    let id_start = find_word(chars, "Id", 0)?;
    let version_start = find_word(chars, "Version", id_start + 2);
    Some((id_start, version_start))
}

/// Char index of `word` standing alone (bounded by whitespace or line ends)
fn find_word(chars: &[char], word: &str, from: usize) -> Option<usize> {
    let word: Vec<char> = word.chars().collect();
    if chars.len() < word.len() {
        return None;
    }
    (from..=chars.len() - word.len()).find(|&i| {
        chars[i..i + word.len()] == word[..]
            && (i == 0 || chars[i - 1].is_whitespace())
            && chars
                .get(i + word.len())
                .is_none_or(|c| c.is_whitespace())
    })
}

fn is_separator(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LISTING: &str = "\
Name                           Id                          Version        Available Source
------------------------------------------------------------------------------------------
Git                            Git.Git                     2.43.0         2.44.0    winget
Microsoft Visual Studio Code   Microsoft.VisualStudioCode  1.86.2                   winget
Some Local Tool                ARP\\Machine\\X64\\LocalTool   1.0
";

    #[test]
    fn parses_ids_between_id_and_version_columns() {
        let ids = parse_winget_list(LISTING);
        assert_eq!(
            ids,
            vec![
                "Git.Git".to_string(),
                "Microsoft.VisualStudioCode".to_string(),
                "ARP\\Machine\\X64\\LocalTool".to_string(),
            ]
        );
    }

    #[test]
    fn ignores_spinner_and_short_rows() {
        let output = "\r-\r\\\r|\rName   Id       Version\n-----------------------\nshort\nTool   Tool.X   1.0\n";
        assert_eq!(parse_winget_list(output), vec!["Tool.X".to_string()]);
    }

    #[test]
    fn no_header_yields_nothing() {
        assert!(parse_winget_list("No installed package found.\n").is_empty());
    }

    #[test]
    fn name_containing_id_word_does_not_confuse_header() {
        let output = "Identity Name   Id        Version\n----\nMy Ide          Ide.Ide   3\n";
        assert_eq!(parse_winget_list(output), vec!["Ide.Ide".to_string()]);
    }
}
