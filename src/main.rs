mod config;
mod input;
mod logging;
mod model;
mod pipeline;
mod report;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::config::{ConfigError, Settings};
use crate::input::{DirSource, InputError, TableSource};
use crate::model::categories::CategorySet;
use crate::model::profile::EntityKind;
use crate::pipeline::run_pipeline;
use crate::pipeline::stage4_emit::write_score_file;
use crate::report::json::render_summary_json;
use crate::report::text::render_report_text;
use crate::report::{KindSummary, RunSummary, build_kind_summary};

const TOOL_NAME: &str = "radar-scores";

#[derive(Debug, Parser)]
#[command(name = TOOL_NAME, version, about = "Category scores for player and team stats")]
struct Cli {
    /// Debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score the tables in a data directory.
    Run(RunArgs),
    /// Print the effective category definitions as JSON.
    Categories(CategoriesArgs),
}

#[derive(Debug, clap::Args)]
struct RunArgs {
    #[arg(long)]
    data_dir: PathBuf,
    #[arg(long)]
    out: PathBuf,
    #[arg(long, value_enum, default_value_t = KindArg::All)]
    kind: KindArg,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Completeness threshold in [0, 1].
    #[arg(long)]
    threshold: Option<f64>,
    /// Skip summary.json and report.txt.
    #[arg(long)]
    no_summary: bool,
}

#[derive(Debug, clap::Args)]
struct CategoriesArgs {
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = KindArg::All)]
    kind: KindArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KindArg {
    Players,
    Teams,
    All,
}

impl KindArg {
    fn kinds(self) -> Vec<EntityKind> {
        match self {
            KindArg::Players => vec![EntityKind::Player],
            KindArg::Teams => vec![EntityKind::Team],
            KindArg::All => vec![EntityKind::Team, EntityKind::Player],
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot write {}: {source}", path.display())]
    Write { path: PathBuf, source: csv::Error },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let result = match &cli.command {
        Command::Run(args) => run(args),
        Command::Categories(args) => categories(args),
    };
    if let Err(err) = result {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

fn resolve_settings(config: Option<&Path>, threshold: Option<f64>) -> Result<Settings, ConfigError> {
    let mut settings = Settings::load(config)?;
    if let Some(t) = threshold {
        settings.profile.completeness_threshold = t;
    }
    settings.validate()?;
    Ok(settings)
}

fn run(args: &RunArgs) -> Result<(), RunError> {
    let settings = resolve_settings(args.config.as_deref(), args.threshold)?;
    let source = DirSource::new(args.data_dir.clone());
    let kinds = score_kinds(&settings, &source, &args.out, args.kind.kinds())?;

    if !args.no_summary {
        let summary = RunSummary {
            tool: TOOL_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_dir: args.data_dir.display().to_string(),
            kinds,
        };
        write_summaries(&summary, &args.out)?;
    }
    Ok(())
}

fn score_kinds(
    settings: &Settings,
    source: &dyn TableSource,
    out_dir: &Path,
    kinds: Vec<EntityKind>,
) -> Result<Vec<KindSummary>, RunError> {
    let mut summaries = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let spec = settings.spec(kind);
        let output = run_pipeline(spec, &settings.profile, source)?;
        let path = out_dir.join(&spec.output_file);
        write_score_file(&path, kind, &output.keys, &output.scores)
            .map_err(|source| RunError::Write {
                path: path.clone(),
                source,
            })?;
        summaries.push(build_kind_summary(spec, &output));
    }
    Ok(summaries)
}

fn write_summaries(summary: &RunSummary, out_dir: &Path) -> Result<(), RunError> {
    std::fs::create_dir_all(out_dir)?;
    let json_path = out_dir.join("summary.json");
    std::fs::write(&json_path, render_summary_json(summary)?)?;
    let text_path = out_dir.join("report.txt");
    std::fs::write(&text_path, render_report_text(summary))?;
    tracing::info!("wrote {} and {}", json_path.display(), text_path.display());
    Ok(())
}

fn categories(args: &CategoriesArgs) -> Result<(), RunError> {
    let settings = resolve_settings(args.config.as_deref(), None)?;
    println!("{}", categories_json(&settings, args.kind)?);
    Ok(())
}

#[derive(Debug, Serialize)]
struct KindCategories<'a> {
    kind: EntityKind,
    categories: &'a CategorySet,
}

fn categories_json(settings: &Settings, kind: KindArg) -> serde_json::Result<String> {
    let listing: Vec<KindCategories<'_>> = kind
        .kinds()
        .into_iter()
        .map(|k| KindCategories {
            kind: k,
            categories: &settings.spec(k).categories,
        })
        .collect();
    serde_json::to_string_pretty(&listing)
}

#[cfg(test)]
#[path = "../tests/src_inline/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
