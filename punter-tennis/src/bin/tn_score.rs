use std::env;
use std::error::Error;
use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use serde::Serialize;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info, warn};

use punter::model::{ScoreReport, ScoredResult, ScoringModel};
use punter::{batch, file, print};
use punter_tennis::domain::Player;
use punter_tennis::model::{advanced_score, Tennis};
use punter_tennis::DEFAULT_CALIBRATION_PATH;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// JSON file of matches: a list, or an object with 'matches' or 'results'
    file: PathBuf,

    /// calibration artifact to load weights and temperature from
    #[clap(short = 'c', long)]
    calibration: Option<PathBuf>,

    /// number of matches to tabulate, best EV first
    #[clap(short = 't', long, default_value = "20")]
    top: usize,

    /// only tabulate and save matches that clear the qualification threshold
    #[clap(short = 'q', long)]
    qualified_only: bool,

    /// where to write the scored matches; defaults to '<file>_scored.json'
    #[clap(short = 'o', long)]
    output: Option<PathBuf>,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if self.top == 0 {
            bail!("at least one match must be tabulated");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct TennisReport {
    #[serde(flatten)]
    report: ScoreReport,
    advanced_score: f64,
    qualifies: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let batch = batch::read_from_file(&args.file)?;
    if batch.malformed > 0 {
        warn!("skipped {} malformed records", batch.malformed);
    }
    if batch.records.is_empty() {
        return Err(format!("no matches found in {}", args.file.display()).into());
    }
    info!("loaded {} matches from {}", batch.records.len(), args.file.display());

    let calibration = args
        .calibration
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CALIBRATION_PATH));
    let model = ScoringModel::load(Tennis::default(), calibration);
    debug!("calibration: {:?}", model.calibration());

    let results = model.score_matches(&batch.records);
    let qualified = results
        .iter()
        .filter(|result| model.sport().qualifies(result))
        .count();
    info!(
        "scored {} matches: {} value bets, {qualified} qualified",
        results.len(),
        results.iter().filter(|result| result.ev() > 0.0).count()
    );

    let results: Vec<ScoredResult<Player>> = if args.qualified_only {
        results
            .into_iter()
            .filter(|result| model.sport().qualifies(result))
            .collect()
    } else {
        results
    };

    let top = &results[..usize::min(args.top, results.len())];
    let table = print::tabulate_scored(top);
    println!("{}", Console::default().render(&table));

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| batch::scored_path(&args.file));
    let reports: Vec<_> = results
        .iter()
        .map(|result| TennisReport {
            report: result.report(),
            advanced_score: (advanced_score(result) * 10.0).round() / 10.0,
            qualifies: model.sport().qualifies(result),
        })
        .collect();
    file::write_json_atomic(&output, &reports)?;
    info!("saved {} scored matches to {}", reports.len(), output.display());
    Ok(())
}
