use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use refdoc_config::{Config, HeadingScheme, LoadOptions, PlanEntry};
use refdoc_core::{Assembler, Directive, Item};
use refdoc_reflect::{Reflect, Snapshot};
use refdoc_utils::build_unified_diff;
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// Exit code signalling that `render --check` found stale output.
pub const EXIT_STALE: i32 = 2;

/// Entry point for CLI execution. Returns the desired exit code.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Render(args) => handle_render(args),
        Command::List(args) => handle_list(args),
    }
}

fn init_tracing(verbose: bool) {
    // -v wins over RUST_LOG; otherwise default to warnings only.
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn handle_render(args: RenderArgs) -> Result<i32> {
    let RenderArgs {
        snapshot,
        config,
        output,
        entity,
        stdout,
        check,
        flat,
        expand_all,
    } = args;

    let mut options = LoadOptions::default();
    if let Some(path) = config {
        options = options.with_override_path(path);
    }
    let config = Config::load(options)?;
    let snapshot = load_snapshot(&snapshot)?;

    let items = if entity.is_empty() {
        plan_items(&config.document, &snapshot)?
    } else {
        entity
            .iter()
            .map(|path| entity_item(&snapshot, path, false))
            .collect::<Result<Vec<_>>>()?
    };
    if items.is_empty() {
        bail!("nothing to document; add [[document]] entries to .refdoc.toml or pass --entity");
    }

    let mut settings = config.render.clone();
    if flat {
        settings.heading_scheme = HeadingScheme::Flat;
    }
    settings.expand_all |= expand_all;
    let assembler = Assembler::from_config(&snapshot, &settings);
    let output = output.unwrap_or(config.output.path);

    if stdout {
        emit(&assembler.render(&items)?);
        return Ok(0);
    }

    if check {
        let rendered = assembler.render(&items)?;
        let current = read_existing(&output)?;
        return match build_unified_diff(&current, &rendered, &output.display().to_string()) {
            Some(diff) => {
                emit(&diff);
                eprintln!("{} is out of date", output.display());
                Ok(EXIT_STALE)
            }
            None => Ok(0),
        };
    }

    assembler.document(&items, &output)?;
    println!("wrote {}", output.display());
    Ok(0)
}

fn handle_list(args: ListArgs) -> Result<i32> {
    let snapshot = load_snapshot(&args.snapshot)?;
    let paths = snapshot.paths();

    match args.format.unwrap_or(ListFormatValue::Plain) {
        ListFormatValue::Plain => {
            for (path, id) in &paths {
                println!("{path}\t{}", snapshot.kind(*id));
            }
        }
        ListFormatValue::Json => {
            let payload = json!({
                "entities": paths
                    .iter()
                    .map(|(path, id)| json!({
                        "path": path,
                        "kind": snapshot.kind(*id).as_str(),
                    }))
                    .collect::<Vec<_>>()
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }
    Ok(0)
}

fn load_snapshot(path: &Path) -> Result<Snapshot> {
    Snapshot::from_path(path).with_context(|| format!("loading snapshot {}", path.display()))
}

/// Translates the configured plan into assembler items.
fn plan_items(plan: &[PlanEntry], snapshot: &Snapshot) -> Result<Vec<Item>> {
    plan.iter()
        .map(|entry| {
            let item: Item = match entry {
                PlanEntry::Markdown(path) => Directive::markdown(path).into(),
                PlanEntry::Entity { path, expand } => entity_item(snapshot, path, *expand)?,
                PlanEntry::TableOfContents { header } => {
                    Directive::table_of_contents_titled(header.as_str()).into()
                }
                PlanEntry::HorizontalRule => Directive::HorizontalRule.into(),
                PlanEntry::Indent => Directive::Indent.into(),
                PlanEntry::Dedent => Directive::Dedent.into(),
            };
            Ok(item)
        })
        .collect()
}

fn entity_item(snapshot: &Snapshot, path: &str, expand: bool) -> Result<Item> {
    let Some(id) = snapshot.lookup(path) else {
        bail!("unknown entity path '{path}'");
    };
    tracing::debug!(path, %id, expand, "planned entity");
    Ok(if expand {
        Directive::IncludeChildren(id).into()
    } else {
        id.into()
    })
}

fn read_existing(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(contents),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(err).with_context(|| format!("reading {}", path.display())),
    }
}

fn emit(content: &str) {
    print!("{}", content);
    if !content.ends_with('\n') {
        println!();
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Reflection-driven Markdown documentation",
    propagate_version = true
)]
struct Cli {
    /// Enable debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble the configured document plan into Markdown
    Render(RenderArgs),
    /// List every documentable path in a snapshot
    List(ListArgs),
}

#[derive(Args)]
struct RenderArgs {
    /// Reflection snapshot (JSON) to document
    #[arg(long, value_name = "FILE")]
    snapshot: PathBuf,
    /// Configuration file applied on top of discovered `.refdoc.toml` files
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Override the configured output path
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
    /// Document these dotted paths instead of the configured plan
    #[arg(long, value_name = "PATH")]
    entity: Vec<String>,
    /// Print the document instead of writing it
    #[arg(long, conflicts_with = "check")]
    stdout: bool,
    /// Exit with status 2 and print a diff when the output is stale
    #[arg(long)]
    check: bool,
    /// Render methods at the same heading level as functions
    #[arg(long)]
    flat: bool,
    /// Expand every documented entity
    #[arg(long = "expand-all")]
    expand_all: bool,
}

#[derive(Args)]
struct ListArgs {
    /// Reflection snapshot (JSON) to inspect
    #[arg(long, value_name = "FILE")]
    snapshot: PathBuf,
    /// Output format
    #[arg(long, value_enum)]
    format: Option<ListFormatValue>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ListFormatValue {
    Plain,
    Json,
}
