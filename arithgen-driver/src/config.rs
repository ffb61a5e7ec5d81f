// SPDX-License-Identifier: Apache-2.0

//! Defaults loaded from an `arithgen.toml` file:
//!
//! ```toml
//! [generator]
//! process = "sky130"
//! powered = true
//! algorithm = "koggestone"
//! bits = 16
//! ```
//!
//! Flags given on the command line take precedence over these values.

use std::path::Path;

use anyhow::Context;
use clap::ArgMatches;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Operand width in bits.
    pub bits: Option<usize>,

    /// Prefix adder algorithm name, e.g. `brentkung`.
    pub algorithm: Option<String>,

    /// Technology process: `none` or `sky130`.
    pub process: Option<String>,

    /// Whether to add VPWR/VGND ports and connect cell power pins.
    pub powered: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ArithgenConfig {
    #[serde(default)]
    generator: GeneratorConfig,
}

pub fn load_config(path: &Path) -> anyhow::Result<GeneratorConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    parse_config(&text).with_context(|| format!("parsing config file {}", path.display()))
}

fn parse_config(text: &str) -> anyhow::Result<GeneratorConfig> {
    let config: ArithgenConfig = toml::from_str(text)?;
    Ok(config.generator)
}

/// Returns the flag value `name` if given on the command line, otherwise the
/// value `from_config` picks out of the config file, if any.
pub fn get_string_setting(
    matches: &ArgMatches,
    name: &str,
    config: &Option<GeneratorConfig>,
    from_config: impl Fn(&GeneratorConfig) -> Option<String>,
) -> Option<String> {
    if let Some(value) = matches.get_one::<String>(name) {
        Some(value.to_string())
    } else if let Some(config) = config {
        from_config(config)
    } else {
        None
    }
}

pub fn get_powered(matches: &ArgMatches, config: &Option<GeneratorConfig>) -> bool {
    if let Some(value) = matches.get_one::<String>("powered") {
        value == "true"
    } else {
        config.as_ref().and_then(|c| c.powered).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generator_table() {
        let config = parse_config(
            r#"
[generator]
process = "sky130"
powered = true
bits = 16
"#,
        )
        .unwrap();
        assert_eq!(
            config,
            GeneratorConfig {
                bits: Some(16),
                algorithm: None,
                process: Some("sky130".to_string()),
                powered: Some(true),
            }
        );
    }

    #[test]
    fn test_missing_table_is_empty() {
        assert_eq!(parse_config("").unwrap(), GeneratorConfig::default());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(parse_config("[generator]\nwidth = 3\n").is_err());
    }
}
