//! # Run Subcommand
//!
//! Replays a scenario file and prints one line per step, followed by the
//! final state of every contract. Exits with code 1 if any step's result
//! differs from its `expect`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::config::PactConfig;
use crate::scenario::{Scenario, ScenarioReport};

/// Arguments for the `pact run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the scenario YAML file.
    pub scenario: PathBuf,

    /// Print the report as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Execute the run subcommand.
pub fn run_scenario(args: &RunArgs, config: &PactConfig) -> Result<u8> {
    let scenario = Scenario::load(&args.scenario)
        .with_context(|| format!("failed to load scenario {}", args.scenario.display()))?;

    tracing::info!(
        path = %args.scenario.display(),
        steps = scenario.steps.len(),
        sign_on = ?config.policy.sign_on,
        "replaying scenario"
    );

    let report = scenario
        .run(config.policy)
        .context("scenario replay failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_text(&report));
    }

    let failures = report.failures().count();
    if failures > 0 {
        eprintln!("FAIL: {failures} step(s) did not match their expectation");
        return Ok(1);
    }
    Ok(0)
}

/// Text rendering of a report.
pub fn render_text(report: &ScenarioReport) -> String {
    let mut out = String::new();
    if let Some(name) = &report.name {
        out.push_str(&format!("Scenario: {name}\n"));
    }

    for step in &report.steps {
        let mark = if step.passed { "ok  " } else { "FAIL" };
        out.push_str(&format!(
            "  [{mark}] #{:<3} {:<40} -> {}",
            step.index, step.action, step.result
        ));
        if let Some(expect) = step.expect.as_deref().filter(|_| !step.passed) {
            out.push_str(&format!(" (expected {expect})"));
        }
        out.push('\n');
    }

    out.push_str("Contracts:\n");
    for contract in &report.contracts {
        out.push_str(&format!("  {}: {}\n", contract.name, contract.state));
        out.push_str(&format!("    Party A: {}\n", join_or_none(&contract.party_a)));
        out.push_str(&format!("    Party B: {}\n", join_or_none(&contract.party_b)));
        out.push_str(&format!("    Transitions: {}\n", contract.transitions));
    }
    out.push_str(&format!("Notifications: {}\n", report.notifications));
    out
}

fn join_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}
