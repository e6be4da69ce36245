//! Output Parsers: pure functions from `git` text output to typed values
//!
//! Nothing here performs I/O. Where a parser needs more information than the
//! text holds (branch listings only carry names), the caller passes a
//! resolver closure.

use std::collections::BTreeSet;

use chrono::{TimeZone, Utc};

use crate::types::{Branch, IndexEntry, LogEntry, ObjectId, Tag};
use crate::{Error, Result};

/// The single meaningful line of `output`.
///
/// Blank lines are ignored. No line yields `None`; more than one is
/// [`Error::AmbiguousResult`].
pub fn first_line(output: &str) -> Result<Option<&str>> {
    let mut lines = output.lines().map(str::trim).filter(|l| !l.is_empty());
    let first = lines.next();
    if lines.next().is_some() {
        return Err(Error::AmbiguousResult {
            output: output.trim_end().to_string(),
        });
    }
    Ok(first)
}

/// A single object id line, as printed by `rev-parse`.
pub fn parse_object_id_line(output: &str) -> Result<Option<ObjectId>> {
    first_line(output)?.map(str::parse).transpose()
}

/// Branches from `git branch` style output.
///
/// The first two columns hold the current-branch marker. Detached entries
/// (`(no branch)`, `(HEAD detached at ..)`) and symbolic aliases
/// (`origin/HEAD -> origin/main`) are skipped. Remote-tracking names lose
/// their `remotes/` prefix. Each remaining name is resolved to a commit
/// through `resolve`.
pub fn parse_branches(
    output: &str,
    mut resolve: impl FnMut(&str) -> Result<ObjectId>,
) -> Result<Vec<Branch>> {
    let mut branches = Vec::new();
    for line in output.lines() {
        let Some(name) = line.get(2..).map(str::trim) else {
            continue;
        };
        if name.is_empty() || name.starts_with('(') || name.contains(" -> ") {
            continue;
        }
        let sha1 = resolve(name)?;
        let short = name.strip_prefix("remotes/").unwrap_or(name);
        branches.push(Branch::new(short, sha1));
    }
    Ok(branches)
}

/// Entries of `git ls-tree <tree-ish>`.
///
/// Fields are `mode type object<TAB>path`; the path keeps embedded spaces.
pub fn parse_ls_tree(output: &str) -> Result<Vec<IndexEntry>> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut fields = line.splitn(4, [' ', '\t']);
            match (fields.next(), fields.next(), fields.next(), fields.next()) {
                (Some(mode), Some(kind), Some(object), Some(file)) => Ok(IndexEntry {
                    mode: mode.to_string(),
                    kind: kind.to_string(),
                    object: object.parse()?,
                    file: file.trim_start().to_string(),
                }),
                _ => Err(Error::UnexpectedOutput {
                    what: "ls-tree",
                    line: line.to_string(),
                }),
            }
        })
        .collect()
}

/// Object ids from `git rev-list`, in the order git printed them.
pub fn parse_rev_list(output: &str) -> Result<Vec<ObjectId>> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::parse)
        .collect()
}

/// Tag names from `git tag -l`; duplicates collapse.
pub fn parse_tag_names(output: &str) -> BTreeSet<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Tags from `for-each-ref --format='%(refname:short) %(objectname) %(*objectname)' refs/tags`.
///
/// Annotated tags carry a third, peeled column naming the commit; lightweight
/// tags point at the commit directly.
pub fn parse_tag_refs(output: &str) -> Result<Vec<Tag>> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [name, object] | [name, _, object] => Ok(Tag {
                    name: name.to_string(),
                    sha1: object.parse()?,
                }),
                _ => Err(Error::UnexpectedOutput {
                    what: "for-each-ref",
                    line: line.to_string(),
                }),
            }
        })
        .collect()
}

/// Remote names from `git remote`, in listed order.
pub fn parse_remotes(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// `true` unless `rev-parse --is-bare-repository` printed `false`.
pub fn parse_is_bare(output: &str) -> Result<bool> {
    Ok(first_line(output)? != Some("false"))
}

/// Entries from `log --pretty=format:%H#%ct`. Surrounding quotes are tolerated.
pub fn parse_log_entries(output: &str) -> Result<Vec<LogEntry>> {
    output
        .lines()
        .map(|line| line.trim().trim_matches('\''))
        .filter(|line| !line.is_empty())
        .map(|line| {
            let unexpected = || Error::UnexpectedOutput {
                what: "log",
                line: line.to_string(),
            };
            let (sha, seconds) = line.split_once('#').ok_or_else(unexpected)?;
            let seconds: i64 = seconds.parse().map_err(|_| unexpected())?;
            let timestamp = Utc.timestamp_opt(seconds, 0).single().ok_or_else(unexpected)?;
            Ok(LogEntry {
                id: sha.parse()?,
                timestamp,
            })
        })
        .collect()
}

/// Pick `preferred` if it is configured, else the first remote listed.
pub fn choose_default_remote(remotes: &[String], preferred: &str) -> Result<String> {
    if remotes.iter().any(|r| r == preferred) {
        return Ok(preferred.to_string());
    }
    remotes.first().cloned().ok_or(Error::NoRemotes)
}

/// Tag names are addressed with spaces replaced by underscores.
pub fn normalize_tag_name(name: &str) -> String {
    name.replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line_ignores_trailing_newline() {
        assert_eq!(first_line("v1.0-3-gabc\n").unwrap(), Some("v1.0-3-gabc"));
        assert_eq!(first_line("").unwrap(), None);
    }

    #[test]
    fn test_parse_is_bare() {
        assert!(!parse_is_bare("false\n").unwrap());
        assert!(parse_is_bare("true\n").unwrap());
    }
}
