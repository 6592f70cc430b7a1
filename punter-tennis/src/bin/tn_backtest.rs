use std::env;
use std::error::Error;
use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info, warn};

use punter::backtest::{evaluate, tune, TuneOptions};
use punter::batch;
use punter::calibration::save_calibration;
use punter::model::ScoringModel;
use punter::print;
use punter_tennis::model::Tennis;
use punter_tennis::DEFAULT_CALIBRATION_PATH;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// directory of settled match files; only JSON files with 'tennis' in their name are read
    #[clap(short = 'd', long, default_value = "results")]
    dir: PathBuf,

    /// only read the last n files, ordered by name
    #[clap(long)]
    days: Option<usize>,

    /// calibration artifact to evaluate and tune from
    #[clap(short = 'c', long)]
    calibration: Option<PathBuf>,

    /// tune the weights and temperature against the settled matches
    #[clap(long)]
    tune: bool,

    /// save the tuned calibration
    #[clap(long)]
    save: bool,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if self.save && !self.tune {
            bail!("--save requires --tune");
        }
        if self.days == Some(0) {
            bail!("lookback must be at least one day");
        }
        Ok(())
    }
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

    let batch = batch::read_from_dir(&args.dir, "tennis", args.days)?;
    info!(
        "loaded {} matches from {} files",
        batch.records.len(),
        batch.files.len()
    );
    if batch.malformed > 0 {
        warn!("skipped {} malformed records", batch.malformed);
    }

    let calibration_path = args
        .calibration
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CALIBRATION_PATH));
    let model = ScoringModel::load(Tennis::default(), &calibration_path);

    if !args.tune {
        let metrics = evaluate(&model, &batch.records);
        if metrics.total == 0 {
            warn!("no settled matches found (need an 'actual_result' of A or B)");
        }
        let table = print::tabulate_metrics(&[("Backtest", &metrics)]);
        println!("{}", Console::default().render(&table));
        return Ok(());
    }

    let tuning = tune(&model, &batch.records, &TuneOptions::default())?;
    let table = print::tabulate_metrics(&[("Before", &tuning.before), ("After", &tuning.after)]);
    println!("{}", Console::default().render(&table));
    let table = print::tabulate_calibrations(&[
        ("Before", model.calibration()),
        ("After", &tuning.calibration),
    ]);
    println!("{}", Console::default().render(&table));

    if args.save {
        save_calibration(&calibration_path, &tuning.calibration, &tuning.after)?;
        info!("saved calibration to {}", calibration_path.display());
    }
    Ok(())
}
