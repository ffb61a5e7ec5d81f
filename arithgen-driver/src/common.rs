// SPDX-License-Identifier: Apache-2.0

use clap::ArgMatches;

use arithgen_g8r::emit_netlist::emit_netlist;
use arithgen_g8r::gate_provider::Process;
use arithgen_g8r::get_summary_stats::get_summary_stats;
use arithgen_g8r::netlist::Netlist;
use arithgen_g8r::prefix_adder::AdderAlgorithm;

use crate::config::{get_powered, get_string_setting, GeneratorConfig};

pub const DEFAULT_BITS: usize = 32;

/// Settings shared by every generator subcommand.
#[derive(Debug)]
pub struct GeneratorFlags {
    pub bits: usize,
    pub algorithm: AdderAlgorithm,
    pub process: Process,
    pub powered: bool,
    pub module_name: Option<String>,
}

pub fn get_bool_flag(matches: &ArgMatches, name: &str) -> bool {
    matches
        .get_one::<String>(name)
        .map(|s| s == "true")
        .unwrap_or(false)
}

pub fn extract_generator_flags(
    matches: &ArgMatches,
    config: &Option<GeneratorConfig>,
) -> Result<GeneratorFlags, String> {
    let bits = match get_string_setting(matches, "bits", config, |c| {
        c.bits.map(|b| b.to_string())
    }) {
        Some(text) => text
            .parse::<usize>()
            .map_err(|e| format!("invalid --bits value {:?}: {}", text, e))?,
        None => DEFAULT_BITS,
    };
    let algorithm = match get_string_setting(matches, "algorithm", config, |c| c.algorithm.clone())
    {
        Some(name) => name.parse::<AdderAlgorithm>().map_err(|e| e.to_string())?,
        None => AdderAlgorithm::default(),
    };
    let process = match get_string_setting(matches, "process", config, |c| c.process.clone()) {
        Some(name) => name.parse::<Process>().map_err(|e| e.to_string())?,
        None => Process::default(),
    };
    let flags = GeneratorFlags {
        bits,
        algorithm,
        process,
        powered: get_powered(matches, config),
        module_name: matches.get_one::<String>("module_name").cloned(),
    };
    log::debug!("generator flags: {:?}", flags);
    Ok(flags)
}

/// Writes the Verilog for `netlist` to `--output` (or stdout) and, with
/// `--stats=true`, summary statistics as JSON to stderr.
pub fn write_netlist_outputs(matches: &ArgMatches, netlist: &Netlist) -> Result<(), String> {
    let verilog = emit_netlist(netlist);
    match matches.get_one::<String>("output") {
        Some(path) => {
            std::fs::write(path, &verilog)
                .map_err(|e| format!("failed to write {}: {}", path, e))?;
            log::info!("wrote {} to {}", netlist.name, path);
        }
        None => print!("{}", verilog),
    }
    if get_bool_flag(matches, "stats") {
        let stats = get_summary_stats(netlist).map_err(|e| e.to_string())?;
        let json = serde_json::to_string_pretty(&stats).map_err(|e| e.to_string())?;
        eprintln!("{}", json);
    }
    Ok(())
}
