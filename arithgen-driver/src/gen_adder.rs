// SPDX-License-Identifier: Apache-2.0

use clap::ArgMatches;

use arithgen_g8r::pipeline::{generate_adder, AdderOptions};

use crate::common::{extract_generator_flags, get_bool_flag, write_netlist_outputs};
use crate::config::GeneratorConfig;

pub fn handle_adder(matches: &ArgMatches, config: &Option<GeneratorConfig>) -> Result<(), String> {
    let flags = extract_generator_flags(matches, config)?;
    let options = AdderOptions {
        bits: flags.bits,
        algorithm: flags.algorithm,
        register_input: get_bool_flag(matches, "register_input"),
        register_output: get_bool_flag(matches, "register_output"),
        powered: flags.powered,
        module_name: flags.module_name,
    };
    let provider = flags.process.provider();
    let netlist = generate_adder(&options, provider.as_ref()).map_err(|e| e.to_string())?;
    log::info!(
        "adder {}: {} gates, latency {}",
        netlist.name,
        netlist.gates.len(),
        options.latency()
    );
    write_netlist_outputs(matches, &netlist)
}
