//! Line-oriented command scripts for `hive run`.
//!
//! One command per line; blank lines and lines starting with `#` are
//! skipped.
//!
//! ```text
//! put PATH TEXT...
//! get PATH
//! ls PATH [OFFSET [COUNT]]
//! rm PATH
//! ```

use anyhow::{bail, Context};
use hive_types::StoragePath;

pub const DEFAULT_LIST_COUNT: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptCommand {
    /// Store the rest of the line as `text/plain`.
    Put { path: StoragePath, text: String },
    Get { path: StoragePath },
    List { path: StoragePath, offset: usize, count: usize },
    Remove { path: StoragePath },
}

/// A parsed command and the 1-based line it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptLine {
    pub line: usize,
    pub command: ScriptCommand,
}

/// Split off the first whitespace-delimited token.
fn next_token(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    match input.find(char::is_whitespace) {
        Some(end) => Some((&input[..end], input[end..].trim_start())),
        None => Some((input, "")),
    }
}

fn parse_path(rest: &str) -> anyhow::Result<(StoragePath, &str)> {
    let Some((token, rest)) = next_token(rest) else {
        bail!("missing path");
    };
    let path = StoragePath::parse(token).with_context(|| format!("bad path {token:?}"))?;
    Ok((path, rest))
}

fn expect_end(rest: &str) -> anyhow::Result<()> {
    if !rest.trim().is_empty() {
        bail!("unexpected arguments: {}", rest.trim());
    }
    Ok(())
}

fn parse_count(token: &str, what: &str) -> anyhow::Result<usize> {
    token
        .parse()
        .with_context(|| format!("{what} must be a non-negative integer, got {token:?}"))
}

/// Parse one line. Returns `None` for blank and comment lines.
pub fn parse_line(line: &str) -> anyhow::Result<Option<ScriptCommand>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let Some((verb, rest)) = next_token(trimmed) else {
        return Ok(None);
    };
    let command = match verb {
        "put" => {
            let (path, text) = parse_path(rest)?;
            ScriptCommand::Put { path, text: text.to_string() }
        }
        "get" => {
            let (path, rest) = parse_path(rest)?;
            expect_end(rest)?;
            ScriptCommand::Get { path }
        }
        "ls" => {
            let (path, rest) = parse_path(rest)?;
            let (offset, rest) = match next_token(rest) {
                Some((token, rest)) => (parse_count(token, "offset")?, rest),
                None => (0, rest),
            };
            let (count, rest) = match next_token(rest) {
                Some((token, rest)) => (parse_count(token, "count")?, rest),
                None => (DEFAULT_LIST_COUNT, rest),
            };
            expect_end(rest)?;
            ScriptCommand::List { path, offset, count }
        }
        "rm" => {
            let (path, rest) = parse_path(rest)?;
            expect_end(rest)?;
            ScriptCommand::Remove { path }
        }
        other => bail!("unknown command {other:?}"),
    };
    Ok(Some(command))
}

/// Parse a whole script, failing on the first bad line.
pub fn parse_script(input: &str) -> anyhow::Result<Vec<ScriptLine>> {
    let mut commands = Vec::new();
    for (index, line) in input.lines().enumerate() {
        let number = index + 1;
        if let Some(command) = parse_line(line).with_context(|| format!("line {number}"))? {
            commands.push(ScriptLine { line: number, command });
        }
    }
    Ok(commands)
}
