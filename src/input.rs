//! Plain-text signal reading.

use std::path::Path;

use anyhow::{Context, Result};

use apollo_packet::Signal;

/// Reads a signal from a text file: one value per line, blank lines and
/// `#` comments skipped.
pub fn read_signal(path: &Path) -> Result<Signal> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read signal file: {}", path.display()))?;

    let mut data = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let value: f64 = trimmed.parse().with_context(|| {
            format!("{}:{}: not a number: {trimmed:?}", path.display(), lineno + 1)
        })?;
        data.push(value);
    }

    Signal::new(data).with_context(|| format!("invalid signal in {}", path.display()))
}
