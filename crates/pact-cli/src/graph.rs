//! # Graph Subcommand
//!
//! Prints the contract transition graph, either as a plain edge table or
//! as Graphviz DOT.

use anyhow::Result;
use clap::{Args, ValueEnum};

use pact_state::ContractState;

/// Arguments for the `pact graph` subcommand.
#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Output format.
    #[arg(long, value_enum, default_value = "table")]
    pub format: GraphFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphFormat {
    /// One `FROM -> TO` edge per line.
    Table,
    /// Graphviz DOT.
    Dot,
}

/// Execute the graph subcommand.
pub fn run_graph(args: &GraphArgs) -> Result<u8> {
    match args.format {
        GraphFormat::Table => print!("{}", render_table()),
        GraphFormat::Dot => print!("{}", render_dot()),
    }
    Ok(0)
}

/// Every legal `(from, to)` pair, in lifecycle order.
pub fn edges() -> Vec<(ContractState, ContractState)> {
    ContractState::all()
        .into_iter()
        .flat_map(|from| from.successors().into_iter().map(move |to| (from, to)))
        .collect()
}

pub fn render_table() -> String {
    let mut out = String::new();
    for (from, to) in edges() {
        out.push_str(&format!("{from} -> {to}\n"));
    }
    for state in ContractState::all().iter().filter(|s| s.is_terminal()) {
        out.push_str(&format!("{state} (terminal)\n"));
    }
    out
}

pub fn render_dot() -> String {
    let mut out = String::from("digraph contract {\n    rankdir=LR;\n");
    for state in ContractState::all() {
        let shape = if state.is_terminal() {
            "doublecircle"
        } else {
            "circle"
        };
        out.push_str(&format!("    \"{state}\" [shape={shape}];\n"));
    }
    for (from, to) in edges() {
        out.push_str(&format!("    \"{from}\" -> \"{to}\";\n"));
    }
    out.push_str("}\n");
    out
}
