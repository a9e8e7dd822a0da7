//! CLI module - Command-line interface definitions and handlers

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;

use alfred_workflow::backends::mdfind::find_results;
use alfred_workflow::core::paths::normalize_path;
use alfred_workflow::{to_xml, ItemOptions, Payload, ResultList, Valid, Workflow};

/// alfred-workflow - build Alfred 2 script filter results from the shell.
#[derive(Parser, Debug)]
#[command(name = "alfred-workflow")]
#[command(
    author,
    version,
    about,
    long_about = r#"alfred-workflow renders results in the item-list XML that Alfred 2 reads
from a script filter's stdout.

Examples:
    echo '[{"title":"Hello","arg":"hi"}]' | alfred-workflow render
    alfred-workflow item --title Open --arg file.txt --valid no
    alfred-workflow find "kMDItemContentType == 'com.apple.application-bundle'"
    alfred-workflow --bundle-id com.example.search paths
"#
)]
pub struct Cli {
    /// Bundle id of the workflow.
    #[arg(
        long,
        global = true,
        env = "alfred_workflow_bundleid",
        value_name = "ID",
        long_help = "Bundle id of the workflow, used to name its cache and data directories.\n\n\
If omitted, the bundleid in ./info.plist is used."
    )]
    pub bundle_id: Option<String>,

    /// Home directory to place workflow data under.
    #[arg(
        long,
        global = true,
        value_name = "DIR",
        long_help = "Home directory under which the Alfred cache and data directories live.\n\n\
Defaults to the current user's home directory."
    )]
    pub home: Option<PathBuf>,

    /// Quiet mode (errors only on stderr).
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug diagnostics on stderr).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a JSON payload as Alfred XML.
    #[command(
        long_about = "Read a JSON object or array of result objects from FILE (or stdin) and\n\
print the item-list XML.\n\n\
Nothing is printed when the payload holds no results.\n\n\
Examples:\n\
  alfred-workflow render results.json\n\
  echo '[{\"title\":\"Hi\"}]' | alfred-workflow render\n"
    )]
    Render {
        /// JSON file to read; stdin when omitted.
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Build a single result from flags and print it as XML.
    Item {
        #[arg(long)]
        uid: Option<String>,

        #[arg(long)]
        arg: Option<String>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        subtitle: Option<String>,

        /// Icon path, or fileicon:PATH / filetype:UTI.
        #[arg(long)]
        icon: Option<String>,

        /// yes/no (or true/false).
        #[arg(long)]
        valid: Option<String>,

        #[arg(long)]
        autocomplete: Option<String>,

        #[arg(long = "type", value_name = "TYPE")]
        kind: Option<String>,

        /// Extra attribute, repeatable.
        #[arg(long = "attr", value_name = "KEY=VALUE")]
        attrs: Vec<String>,
    },

    /// Search Spotlight with mdfind and print the matches as XML.
    Find {
        /// mdfind query.
        #[arg(value_name = "QUERY")]
        query: String,
    },

    /// Print the workflow's directories and resolved storage path.
    Paths {
        /// File to locate in the working, data and cache directories.
        #[arg(long, default_value = "settings.plist", value_name = "NAME")]
        file: String,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Render { file } => run_render(file),

        Commands::Item {
            uid,
            arg,
            title,
            subtitle,
            icon,
            valid,
            autocomplete,
            kind,
            attrs,
        } => {
            let options = ItemOptions {
                uid,
                arg,
                title,
                subtitle,
                icon,
                valid: valid.as_deref().map(parse_valid),
                autocomplete,
                kind,
                ..Default::default()
            };
            run_item(options, &attrs)
        }

        Commands::Find { query } => {
            let results = find_results(&query)?;
            print_xml(to_xml(&results, Payload::Empty)?);
            Ok(())
        }

        Commands::Paths { file } => {
            let workflow = match cli.home {
                Some(home) => {
                    let working_dir =
                        std::env::current_dir().context("failed to read working directory")?;
                    Workflow::with_dirs(cli.bundle_id.as_deref(), home, working_dir)?
                }
                None => Workflow::new(cli.bundle_id.as_deref())?,
            };
            run_paths(&workflow, &file)
        }
    }
}

fn run_render(file: Option<PathBuf>) -> Result<()> {
    let bytes = match file {
        Some(path) => {
            std::fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?
        }
        None => {
            let mut buffer = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buffer)
                .context("failed to read stdin")?;
            buffer
        }
    };

    print_xml(to_xml(&ResultList::new(), Payload::Json(bytes))?);
    Ok(())
}

fn run_item(options: ItemOptions, attrs: &[String]) -> Result<()> {
    let mut options = options;
    for attr in attrs {
        let Some((key, value)) = attr.split_once('=') else {
            bail!("invalid --attr {:?}: expected KEY=VALUE", attr);
        };
        options = options.with_attribute(key, value);
    }

    let mut results = ResultList::new();
    results.add_result(options);
    print_xml(to_xml(&results, Payload::Empty)?);
    Ok(())
}

fn run_paths(workflow: &Workflow, file: &str) -> Result<()> {
    let report = serde_json::json!({
        "bundle": workflow.bundle(),
        "cache": normalize_path(workflow.cache_dir()),
        "data": normalize_path(workflow.data_dir()),
        "working": normalize_path(workflow.working_dir()),
        "storage": normalize_path(&workflow.storage_path(file)),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn parse_valid(value: &str) -> Valid {
    match value {
        "true" => Valid::Flag(true),
        "false" => Valid::Flag(false),
        other => Valid::from(other),
    }
}

fn print_xml(xml: Option<String>) {
    match xml {
        Some(xml) => print!("{}", xml),
        None => tracing::warn!("no results to render"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(parse_valid("true"), Valid::Flag(true));
        assert_eq!(parse_valid("false"), Valid::Flag(false));
        assert_eq!(parse_valid("no"), Valid::from("no"));
        assert_eq!(parse_valid("maybe").as_attribute(), None);
    }

    #[test]
    fn test_cli_parses_item() {
        let cli = Cli::try_parse_from([
            "alfred-workflow",
            "item",
            "--title",
            "Open",
            "--attr",
            "match=open file",
        ])
        .unwrap();

        match cli.command {
            Commands::Item { title, attrs, .. } => {
                assert_eq!(title.as_deref(), Some("Open"));
                assert_eq!(attrs, vec!["match=open file"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
