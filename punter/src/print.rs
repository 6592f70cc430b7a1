//! Console tables for scored matches, backtest metrics and calibrations.

use stanza::style::HAlign::Left;
use stanza::style::{HAlign, Header, MinWidth, Styles};
use stanza::table::{Cell, Col, Row, Table};
use strum::IntoEnumIterator;

use crate::backtest::Metrics;
use crate::calibration::Calibration;
use crate::model::ScoredResult;
use crate::outcome::Outcome;

pub fn tabulate_scored<O: Outcome>(results: &[ScoredResult<O>]) -> Table {
    let mut header: Vec<Cell> = vec!["Match".into()];
    header.extend(O::iter().map(|outcome| format!("P({})", outcome.label()).into()));
    header.extend(
        ["Pick", "Odds", "EV", "Edge", "Kelly", "Conf", "DQ"]
            .into_iter()
            .map(Into::into),
    );

    let mut cols = vec![Col::new(Styles::default().with(MinWidth(30)).with(Left))];
    cols.extend(
        (1..header.len()).map(|_| Col::new(Styles::default().with(MinWidth(6)).with(HAlign::Right))),
    );
    let mut table = Table::default()
        .with_cols(cols)
        .with_row(Row::new(Styles::default().with(Header(true)), header));

    for result in results {
        let mut cells: Vec<Cell> = vec![format!("{} vs {}", result.home_team, result.away_team).into()];
        cells.extend(O::iter().map(|outcome| format!("{:.3}", result.prob(outcome)).into()));
        cells.push(result.pick.outcome.label().into());
        cells.push(
            result
                .pick
                .odds
                .map(|odds| format!("{odds:.2}"))
                .unwrap_or_else(|| "-".to_string())
                .into(),
        );
        cells.push(format!("{:+.3}", result.pick.valuation.ev).into());
        cells.push(format!("{:+.2}", result.pick.valuation.edge).into());
        cells.push(format!("{:.2}", result.pick.valuation.kelly).into());
        cells.push(format!("{:.1}", result.confidence).into());
        cells.push(format!("{:.2}", result.data_quality).into());
        table.push_row(Row::new(Styles::default(), cells));
    }
    table
}

/// Side-by-side metrics, one column per labelled run.
pub fn tabulate_metrics(runs: &[(&str, &Metrics)]) -> Table {
    let mut cols = vec![Col::new(Styles::default().with(MinWidth(20)).with(Left))];
    cols.extend(
        runs.iter()
            .map(|_| Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right))),
    );
    let mut header: Vec<Cell> = vec!["Metric".into()];
    header.extend(runs.iter().map(|(label, _)| label.to_string().into()));
    let mut table = Table::default()
        .with_cols(cols)
        .with_row(Row::new(Styles::default().with(Header(true)), header));

    let rows: [(&str, fn(&Metrics) -> String); 8] = [
        ("Evaluated", |metrics| metrics.total.to_string()),
        ("Correct", |metrics| metrics.correct.to_string()),
        ("Skipped", |metrics| metrics.skipped.to_string()),
        ("Accuracy", |metrics| format!("{:.2}%", metrics.accuracy * 100.0)),
        ("Brier score", |metrics| format!("{:.4}", metrics.brier_score)),
        ("Value bets", |metrics| metrics.value_bets_placed.to_string()),
        ("ROI", |metrics| format!("{:+.2}%", metrics.roi)),
        ("Net profit (units)", |metrics| format!("{:+.2}", metrics.net_profit_units)),
    ];
    for (name, render) in rows {
        let mut cells: Vec<Cell> = vec![name.into()];
        cells.extend(runs.iter().map(|(_, metrics)| render(metrics).into()));
        table.push_row(Row::new(Styles::default(), cells));
    }
    table
}

/// Source weights and temperature of one or more calibrations, one column per labelled
/// calibration. Sources are taken from the first calibration.
pub fn tabulate_calibrations(calibrations: &[(&str, &Calibration)]) -> Table {
    let mut cols = vec![Col::new(Styles::default().with(MinWidth(15)).with(Left))];
    cols.extend(
        calibrations
            .iter()
            .map(|_| Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right))),
    );
    let mut header: Vec<Cell> = vec!["Source".into()];
    header.extend(calibrations.iter().map(|(label, _)| label.to_string().into()));
    let mut table = Table::default()
        .with_cols(cols)
        .with_row(Row::new(Styles::default().with(Header(true)), header));

    let sources = calibrations
        .first()
        .map(|(_, calibration)| calibration.weights.sources())
        .unwrap_or_default();
    for source in sources {
        let mut cells: Vec<Cell> = vec![source.clone().into()];
        cells.extend(
            calibrations
                .iter()
                .map(|(_, calibration)| format!("{:.4}", calibration.weights.get(&source)).into()),
        );
        table.push_row(Row::new(Styles::default(), cells));
    }
    let mut cells: Vec<Cell> = vec!["temperature".into()];
    cells.extend(
        calibrations
            .iter()
            .map(|(_, calibration)| format!("{:.4}", calibration.temperature).into()),
    );
    table.push_row(Row::new(Styles::default(), cells));
    table
}
