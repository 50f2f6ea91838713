//! Select command: choose a best basis and report or export it.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{info, info_span};

use apollo_basis::{
    best_basis, is_valid_basis, joint_best_basis, least_dependent_basis, shift_best_basis,
    CostFunction, SelectConfig,
};
use apollo_packet::{
    decompose_ensemble, shift_decompose, DecomposeMode, ShiftConfig, Signal, Wavelet,
};

use crate::cli::SelectArgs;
use crate::config::{AnalysisToml, ApolloConfig};
use crate::input;

/// One selected node in the JSON document.
#[derive(Serialize)]
struct NodeDoc {
    depth: usize,
    index: usize,
    len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    shift: Option<usize>,
}

/// Selected-basis JSON document.
#[derive(Serialize)]
struct BasisDoc {
    method: String,
    wavelet: String,
    cost: String,
    total_cost: f64,
    nodes: Vec<NodeDoc>,
}

fn write_output(doc: &BasisDoc, output: Option<PathBuf>) -> Result<()> {
    let Some(path) = output else {
        return Ok(());
    };
    let json = serde_json::to_string_pretty(doc).context("failed to serialize basis")?;
    std::fs::write(&path, json)
        .with_context(|| format!("failed to write basis document: {}", path.display()))?;
    info!(path = %path.display(), "basis document written");
    Ok(())
}

fn print_nodes(doc: &BasisDoc) {
    let tagged = doc.nodes.iter().any(|n| n.shift.is_some());
    if tagged {
        println!("depth  index  len  shift");
    } else {
        println!("depth  index  len");
    }
    for node in &doc.nodes {
        match node.shift {
            Some(shift) => println!(
                "{:>5}  {:>5}  {:>3}  {shift:>5}",
                node.depth, node.index, node.len
            ),
            None => println!("{:>5}  {:>5}  {:>3}", node.depth, node.index, node.len),
        }
    }
    println!("total cost: {:.6}", doc.total_cost);
}

fn doc_skeleton(analysis: &AnalysisToml, total_cost: f64, nodes: Vec<NodeDoc>) -> BasisDoc {
    BasisDoc {
        method: analysis.method.clone(),
        wavelet: analysis.wavelet.clone(),
        cost: analysis.cost.clone(),
        total_cost,
        nodes,
    }
}

/// Run the selection pipeline.
pub fn run(args: SelectArgs) -> Result<()> {
    let _cmd = info_span!("select").entered();

    // 1. Load project TOML
    let toml_str = std::fs::read_to_string(&args.config)
        .with_context(|| format!("failed to read config file: {}", args.config.display()))?;
    let config: ApolloConfig = toml::from_str(&toml_str).context("failed to parse TOML config")?;
    let analysis = &config.analysis;

    let wavelet = Wavelet::from_name(&analysis.wavelet).context("bad [analysis].wavelet")?;
    let cost = CostFunction::from_name(&analysis.cost).context("bad [analysis].cost")?;
    let select_config = SelectConfig::new(cost).with_redundant(analysis.redundant);

    // 2. Read the signal(s)
    let signals: Vec<Signal> = args
        .input
        .iter()
        .map(|path| input::read_signal(path))
        .collect::<Result<_>>()?;
    info!(n_signals = signals.len(), "signals loaded");

    // 3. Dispatch on selection method
    let method = analysis.method.to_lowercase();
    let doc = match method.as_str() {
        "bb" => {
            if signals.len() != 1 {
                bail!(
                    "method 'bb' takes exactly one input signal, got {}. \
                     Use 'jbb' or 'lsdb' for ensembles.",
                    signals.len()
                );
            }
            let mode = DecomposeMode::from_name(&analysis.mode).context("bad [analysis].mode")?;
            let trees = decompose_ensemble(&signals, wavelet, analysis.depth, mode)
                .context("decomposition failed")?;
            let basis = best_basis(&trees[0], &select_config).context("selection failed")?;
            assert!(is_valid_basis(signals[0].len(), &basis));
            let nodes = basis
                .selected()
                .into_iter()
                .map(|(depth, index)| NodeDoc {
                    depth,
                    index,
                    len: trees[0].node(depth, index).expect("selected node").len(),
                    shift: None,
                })
                .collect();
            doc_skeleton(analysis, basis.total_cost(), nodes)
        }
        "jbb" | "lsdb" => {
            if signals.len() < 2 {
                bail!(
                    "method '{}' expects an ensemble of at least 2 signals, got {}",
                    analysis.method,
                    signals.len()
                );
            }
            let mode = DecomposeMode::from_name(&analysis.mode).context("bad [analysis].mode")?;
            let trees = decompose_ensemble(&signals, wavelet, analysis.depth, mode)
                .context("decomposition failed")?;
            let basis = if method == "jbb" {
                joint_best_basis(&trees, &select_config).context("selection failed")?
            } else {
                let result =
                    least_dependent_basis(&trees, &select_config).context("selection failed")?;
                info!(n_rotations = result.n_rotations(), "stored decorrelating rotations");
                result.basis().clone()
            };
            assert!(is_valid_basis(signals[0].len(), &basis));
            let nodes = basis
                .selected()
                .into_iter()
                .map(|(depth, index)| NodeDoc {
                    depth,
                    index,
                    len: trees[0].node(depth, index).expect("selected node").len(),
                    shift: None,
                })
                .collect();
            doc_skeleton(analysis, basis.total_cost(), nodes)
        }
        "sibb" => {
            if signals.len() != 1 {
                bail!("method 'sibb' takes exactly one input signal, got {}", signals.len());
            }
            let shift_config = ShiftConfig::new().with_gain(analysis.expansion_gain);
            let tree = shift_decompose(&signals[0], wavelet, analysis.depth, &shift_config)
                .context("shift-invariant decomposition failed")?;
            let basis = shift_best_basis(&tree, &select_config).context("selection failed")?;
            let nodes = basis
                .selected()
                .map(|(&(depth, index), &shift)| NodeDoc {
                    depth,
                    index,
                    len: tree.node(depth, index).expect("selected node").coeffs().len(),
                    shift: Some(shift),
                })
                .collect();
            doc_skeleton(analysis, basis.total_cost(), nodes)
        }
        other => bail!("unknown selection method: {other:?} (expected bb, jbb, lsdb, or sibb)"),
    };

    info!(
        method = %doc.method,
        n_selected = doc.nodes.len(),
        total_cost = doc.total_cost,
        "basis selected"
    );

    // 4. Report
    print_nodes(&doc);
    write_output(&doc, args.output)
}
