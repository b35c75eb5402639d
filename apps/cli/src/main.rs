#![deny(warnings)]

//! Headless driver: project a scenario and print the stitched series.

use anyhow::{Context, Result};
use plan_charts::ScenarioForm;
use plan_core::{Projection, RateTable, Scenario};
use rust_decimal::Decimal;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

struct Args {
    scenario: Option<String>,
    figure_out: Option<String>,
    color: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        scenario: None,
        figure_out: None,
        color: true,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--scenario" => args.scenario = it.next(),
            "--figure" => args.figure_out = it.next(),
            "--no-color" => args.color = false,
            _ => {}
        }
    }
    args
}

fn load_scenario(path: &str) -> Result<Scenario> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading scenario file {path}"))?;
    let scenario: Scenario =
        serde_yaml::from_str(&text).with_context(|| format!("parsing scenario file {path}"))?;
    Ok(scenario)
}

fn render_table(projection: &Projection, color: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>5}  {:>12}  {:>12}  {:>10}  {:>10}  {:>10}  {:>8}\n",
        "month", "fund", "revenue", "ndays_sc", "ndays_dir", "ndays_out", "npersons"
    ));
    for row in projection.rows() {
        let money = |v: Decimal| {
            let cell = format!("{:>12}", v.to_string());
            if color {
                plan_charts::ansi_negative(&cell, v)
            } else {
                cell
            }
        };
        out.push_str(&format!(
            "{:>5}  {}  {}  {:>10}  {:>10}  {:>10}  {:>8}\n",
            row.month,
            money(row.fund),
            money(row.revenue),
            row.ndays_subcontract.to_string(),
            row.ndays_direct.to_string(),
            row.ndays_outsourced.to_string(),
            row.npersons
        ));
    }
    out
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args();
    info!(scenario = ?args.scenario, "starting projection");

    let scenario = match &args.scenario {
        Some(path) => load_scenario(path)?,
        None => ScenarioForm::reference().into_scenario()?,
    };
    let rates = RateTable::default();
    let projection = plan_engine::stitch(&scenario, &rates)?;

    print!("{}", render_table(&projection, args.color));

    if let Some(path) = &args.figure_out {
        let fig = plan_charts::figure(&projection);
        std::fs::write(path, serde_json::to_string_pretty(&fig)?)
            .with_context(|| format!("writing figure model to {path}"))?;
        info!(path = %path, "figure model written");
    }

    println!(
        "Projection OK | phases: {} | months: {} | final fund: {}",
        scenario.phases.len(),
        projection.len(),
        plan_engine::handoff_fund(&projection, scenario.initial_fund)
    );

    Ok(())
}
