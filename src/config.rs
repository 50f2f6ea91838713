use serde::Deserialize;

/// Top-level Apollo configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ApolloConfig {
    /// Analysis settings.
    #[serde(default)]
    pub analysis: AnalysisToml,
}

/// Settings for decomposition and basis selection.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisToml {
    /// Wavelet filter name (haar, d4, d6, d8, la8, la16).
    #[serde(default = "default_wavelet")]
    pub wavelet: String,

    /// Decomposition depth.
    #[serde(default = "default_depth")]
    pub depth: usize,

    /// Decomposition mode (ordinary, stationary, autocorrelation,
    /// shift-invariant).
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Cost functional name (shannon, log-energy, norm).
    #[serde(default = "default_cost")]
    pub cost: String,

    /// Selection method (bb, jbb, lsdb, sibb).
    #[serde(default = "default_method")]
    pub method: String,

    /// Whether the decomposition is redundant; must match the mode.
    #[serde(default)]
    pub redundant: bool,

    /// Admissibility margin for shift-invariant node expansion.
    #[serde(default)]
    pub expansion_gain: f64,
}

impl Default for AnalysisToml {
    fn default() -> Self {
        Self {
            wavelet: default_wavelet(),
            depth: default_depth(),
            mode: default_mode(),
            cost: default_cost(),
            method: default_method(),
            redundant: false,
            expansion_gain: 0.0,
        }
    }
}

fn default_wavelet() -> String {
    "la8".to_string()
}
fn default_depth() -> usize {
    4
}
fn default_mode() -> String {
    "ordinary".to_string()
}
fn default_cost() -> String {
    "shannon".to_string()
}
fn default_method() -> String {
    "bb".to_string()
}
