// SPDX-License-Identifier: Apache-2.0

use clap::ArgMatches;

use arithgen_g8r::booth::PartialProductScheme;
use arithgen_g8r::pipeline::{generate_multiplier, MultiplierOptions};

use crate::common::{extract_generator_flags, get_bool_flag, write_netlist_outputs};
use crate::config::GeneratorConfig;

pub fn handle_multiplier(
    matches: &ArgMatches,
    config: &Option<GeneratorConfig>,
) -> Result<(), String> {
    let flags = extract_generator_flags(matches, config)?;
    let partial_products = match matches.get_one::<String>("partial_products") {
        Some(name) => name
            .parse::<PartialProductScheme>()
            .map_err(|e| e.to_string())?,
        None => PartialProductScheme::default(),
    };
    let options = MultiplierOptions {
        bits: flags.bits,
        partial_products,
        final_adder: flags.algorithm,
        multiply_add: get_bool_flag(matches, "multiply_add"),
        register_input: get_bool_flag(matches, "register_input"),
        register_middle: get_bool_flag(matches, "register_middle"),
        register_output: get_bool_flag(matches, "register_output"),
        powered: flags.powered,
        module_name: flags.module_name,
    };
    let provider = flags.process.provider();
    let netlist = generate_multiplier(&options, provider.as_ref()).map_err(|e| e.to_string())?;
    log::info!(
        "multiplier {}: {} gates, latency {}",
        netlist.name,
        netlist.gates.len(),
        options.latency()
    );
    write_netlist_outputs(matches, &netlist)
}
