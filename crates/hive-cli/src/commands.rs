use std::io::Read;

use anyhow::Context;
use colored::Colorize;
use hive_routing::{Namespace, NamespaceConfig};
use hive_store::{Storage, StorageValue, StorageValueInfo};
use serde::Serialize;
use tracing::debug;

use crate::cli::*;
use crate::script::{parse_script, ScriptCommand};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Mounts(args) => cmd_mounts(args, format),
        Command::Run(args) => cmd_run(args, format),
    }
}

fn load_namespace(config: &NamespaceConfig) -> anyhow::Result<Namespace> {
    config.build().context("failed to build namespace")
}

fn cmd_mounts(args: MountsArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = NamespaceConfig::load(&args.config)
        .with_context(|| format!("failed to read {}", args.config.display()))?;
    load_namespace(&config)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
        OutputFormat::Text => {
            println!("{} {} mounts, user {}", "✓".green().bold(), config.mounts.len(), config.user.bold());
            for mount in &config.mounts {
                println!("  {:<24} {}", mount.prefix.yellow(), format!("{:?}", mount.backend).to_lowercase().cyan());
            }
        }
    }
    Ok(())
}

fn cmd_run(args: RunArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = NamespaceConfig::load(&args.config)
        .with_context(|| format!("failed to read {}", args.config.display()))?;
    let ns = load_namespace(&config)?;
    let input = match &args.script {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            input
        }
    };
    let lines = parse_script(&input)?;
    debug!(commands = lines.len(), "script parsed");
    for line in &lines {
        let output = execute(&ns, &line.command).with_context(|| format!("line {}", line.line))?;
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string(&output)?),
            OutputFormat::Text => print_text(&output),
        }
    }
    Ok(())
}

/// Result of one script command.
#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Output {
    Put { path: String, content_type: String, size: usize },
    Get { path: String, value: Option<ValueView> },
    Ls { path: String, entries: Vec<EntryView> },
    Rm { path: String },
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct ValueView {
    pub content_type: String,
    pub size: usize,
    /// Present when the payload is UTF-8 text.
    pub text: Option<String>,
}

impl From<&StorageValue> for ValueView {
    fn from(value: &StorageValue) -> Self {
        Self {
            content_type: value.content_type().as_str().to_string(),
            size: value.value().map_or(0, |bytes| bytes.len()),
            text: value.text().map(str::to_string),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct EntryView {
    pub path: String,
    pub created_by: String,
    pub created_at: u64,
    pub modified_by: String,
    pub modified_at: u64,
}

impl From<&StorageValueInfo> for EntryView {
    fn from(info: &StorageValueInfo) -> Self {
        let audit = info.audit();
        Self {
            path: info.path().to_string(),
            created_by: audit.created_by().to_string(),
            created_at: audit.created_at().as_millis(),
            modified_by: audit.modified_by().to_string(),
            modified_at: audit.modified_at().as_millis(),
        }
    }
}

pub fn execute(ns: &Namespace, command: &ScriptCommand) -> anyhow::Result<Output> {
    let ctx = &ns.context;
    Ok(match command {
        ScriptCommand::Put { path, text } => {
            let saved = ns.storage.save(StorageValue::from_text(path.clone(), text.as_str()), ctx)?;
            Output::Put {
                path: saved.path().to_string(),
                content_type: saved.content_type().as_str().to_string(),
                size: saved.value().map_or(0, |bytes| bytes.len()),
            }
        }
        ScriptCommand::Get { path } => Output::Get {
            path: path.to_string(),
            value: ns.storage.load(path, ctx)?.as_ref().map(ValueView::from),
        },
        ScriptCommand::List { path, offset, count } => Output::Ls {
            path: path.to_string(),
            entries: ns.storage.list(path, *offset, *count, ctx)?.iter().map(EntryView::from).collect(),
        },
        ScriptCommand::Remove { path } => {
            ns.storage.delete(path, ctx)?;
            Output::Rm { path: path.to_string() }
        }
    })
}

fn print_text(output: &Output) {
    match output {
        Output::Put { path, content_type, size } => {
            println!("{} {} ({}, {} bytes)", "✓".green().bold(), path.yellow(), content_type, size)
        }
        Output::Get { path, value: Some(view) } => match &view.text {
            Some(text) => println!("{} = {}", path.yellow(), text),
            None => println!("{} = <{} bytes {}>", path.yellow(), view.size, view.content_type.dimmed()),
        },
        Output::Get { path, value: None } => println!("{} {}", path.yellow(), "(not found)".dimmed()),
        Output::Ls { path, entries } => {
            println!("{} ({} entries)", path.bold(), entries.len());
            for entry in entries {
                println!("  {}  {} @ {}", entry.path.yellow(), entry.modified_by.cyan(), entry.modified_at);
            }
        }
        Output::Rm { path } => println!("{} removed {}", "✓".green(), path.yellow()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse_line;

    fn namespace() -> Namespace {
        NamespaceConfig::from_toml_str(
            "user = \"cli\"\n\
             [[mount]]\nprefix = \"/data\"\nbackend = \"tree\"\n\
             [[mount]]\nprefix = \"/env\"\nbackend = \"environment\"\n",
        )
        .unwrap()
        .build()
        .unwrap()
    }

    fn run(ns: &Namespace, line: &str) -> anyhow::Result<Output> {
        execute(ns, &parse_line(line).unwrap().unwrap())
    }

    #[test]
    fn put_then_get() {
        let ns = namespace();
        let put = run(&ns, "put /data/notes/a.txt hello").unwrap();
        assert_eq!(
            put,
            Output::Put { path: "/data/notes/a.txt".into(), content_type: "text/plain".into(), size: 5 }
        );

        match run(&ns, "get /data/notes/a.txt").unwrap() {
            Output::Get { value: Some(view), .. } => assert_eq!(view.text.as_deref(), Some("hello")),
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[test]
    fn get_missing() {
        let ns = namespace();
        assert_eq!(
            run(&ns, "get /data/none").unwrap(),
            Output::Get { path: "/data/none".into(), value: None }
        );
    }

    #[test]
    fn ls_shows_audit() {
        let ns = namespace();
        run(&ns, "put /data/dir/x 1").unwrap();
        match run(&ns, "ls /data").unwrap() {
            Output::Ls { entries, .. } => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].path, "/data/dir");
                assert_eq!(entries[0].created_by, "cli");
            }
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[test]
    fn rm_then_get() {
        let ns = namespace();
        run(&ns, "put /env/TOKEN abc").unwrap();
        run(&ns, "rm /env/TOKEN").unwrap();
        assert!(matches!(run(&ns, "get /env/TOKEN").unwrap(), Output::Get { value: None, .. }));
    }

    #[test]
    fn put_outside_mounts_fails() {
        let ns = namespace();
        assert!(run(&ns, "put /elsewhere/x 1").is_err());
    }

    #[test]
    fn json_output_is_tagged() {
        let json = serde_json::to_value(Output::Rm { path: "/data/x".into() }).unwrap();
        assert_eq!(json, serde_json::json!({"op": "rm", "path": "/data/x"}));
    }

    #[test]
    fn config_file_roundtrip() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[[mount]]\nprefix = \"/data\"\nbackend = \"tree\"").unwrap();
        let config = NamespaceConfig::load(file.path()).unwrap();
        assert!(load_namespace(&config).is_ok());
    }
}
