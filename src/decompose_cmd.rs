//! Decompose command: build a packet tree and print a level summary.

use anyhow::{Context, Result};
use tracing::{info, info_span};

use apollo_packet::{decompose, shift_decompose, DecomposeMode, ShiftConfig, Wavelet};

use crate::cli::DecomposeArgs;
use crate::config::ApolloConfig;
use crate::input;

/// Run the decomposition pipeline.
pub fn run(args: DecomposeArgs) -> Result<()> {
    let _cmd = info_span!("decompose").entered();

    // 1. Load project TOML
    let toml_str = std::fs::read_to_string(&args.config)
        .with_context(|| format!("failed to read config file: {}", args.config.display()))?;
    let config: ApolloConfig = toml::from_str(&toml_str).context("failed to parse TOML config")?;
    let analysis = &config.analysis;

    // 2. Read the signal
    let signal = input::read_signal(&args.input)?;
    info!(path = %args.input.display(), len = signal.len(), "signal loaded");

    let wavelet = Wavelet::from_name(&analysis.wavelet).context("bad [analysis].wavelet")?;

    // 3. Decompose and summarize
    if analysis.mode.to_lowercase() == "shift-invariant" {
        let shift_config = ShiftConfig::new().with_gain(analysis.expansion_gain);
        let tree = shift_decompose(&signal, wavelet, analysis.depth, &shift_config)
            .context("shift-invariant decomposition failed")?;
        info!(
            n_nodes = tree.n_nodes(),
            deepest = tree.deepest(),
            "irregular tree built"
        );

        println!("depth  index  len  shift  leaf");
        for (&(d, i), node) in tree.iter() {
            println!(
                "{d:>5}  {i:>5}  {len:>3}  {shift:>5}  {leaf}",
                len = node.coeffs().len(),
                shift = node.local_shift(),
                leaf = if node.expanded() { "-" } else { "leaf" }
            );
        }
        return Ok(());
    }

    let mode = DecomposeMode::from_name(&analysis.mode).context("bad [analysis].mode")?;
    let tree = decompose(&signal, wavelet, analysis.depth, mode)
        .context("packet decomposition failed")?;
    info!(depth = tree.depth(), n_nodes = tree.n_nodes(), "tree built");

    println!("depth  nodes  node_len  level_energy");
    for d in 0..=tree.depth() {
        let energy: f64 = (0..tree.nodes_at(d))
            .flat_map(|i| tree.node(d, i).expect("complete tree"))
            .map(|x| x * x)
            .sum();
        let node_len = tree.node(d, 0).expect("complete tree").len();
        println!(
            "{d:>5}  {nodes:>5}  {node_len:>8}  {energy:>12.6}",
            nodes = tree.nodes_at(d)
        );
    }

    Ok(())
}
