// SPDX-License-Identifier: Apache-2.0

//! Command line driver that generates adder and multiplier netlists as
//! structural Verilog.
//!
//! Commands are given like:
//!
//! ```text
//! arithgen-driver <global-options> <command> <command-args-and-options>
//! ```
//!
//! Commands are:
//!
//! - adder: `o = (a + b) mod 2^N` via a parallel-prefix tree.
//! - multiplier: `o = (a * b [+ c]) mod 2^(2N)` via Booth partial products and
//!   a Dadda tree.
//! - version: prints the driver version.
//!
//! Sample usage:
//!
//! ```shell
//! $ cargo run -- adder --bits 16 --algorithm koggestone
//! $ cargo run -- --config=$HOME/arithgen.toml \
//!     multiplier --bits 8 --multiply_add true \
//!     --register_input true --register_output true --stats true
//! ```

mod common;
mod config;
mod gen_adder;
mod gen_multiplier;
mod report_cli_error;

use std::path::Path;

use clap::{Arg, ArgAction};
use once_cell::sync::Lazy;

use arithgen_g8r::booth::PartialProductScheme;
use arithgen_g8r::gate_provider::Process;
use arithgen_g8r::prefix_adder::AdderAlgorithm;

use crate::report_cli_error::report_cli_error_and_exit;

static DEFAULT_ALGORITHM: Lazy<String> = Lazy::new(|| AdderAlgorithm::default().to_string());
static DEFAULT_PROCESS: Lazy<String> = Lazy::new(|| Process::default().to_string());
static DEFAULT_PARTIAL_PRODUCTS: Lazy<String> =
    Lazy::new(|| PartialProductScheme::default().to_string());

trait AppExt {
    fn add_generator_args(self) -> Self;
    fn add_output_args(self) -> Self;
    fn add_bool_arg(self, long: &'static str, help: &'static str) -> Self;
}

impl AppExt for clap::Command {
    fn add_generator_args(self) -> Self {
        (self as clap::Command)
            .arg(
                Arg::new("bits")
                    .long("bits")
                    .value_name("BITS")
                    .help(format!(
                        "Operand width in bits (default {})",
                        common::DEFAULT_BITS
                    ))
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("algorithm")
                    .long("algorithm")
                    .value_name("ALGORITHM")
                    .help(format!(
                        "Prefix adder: brentkung, koggestone, hancarlson or inferred (default {})",
                        *DEFAULT_ALGORITHM
                    ))
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("process")
                    .long("process")
                    .value_name("PROCESS")
                    .help(format!(
                        "Technology process: none or sky130 (default {})",
                        *DEFAULT_PROCESS
                    ))
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("module_name")
                    .long("module_name")
                    .value_name("MODULE_NAME")
                    .help("Name of the generated module"),
            )
            .add_bool_arg("powered", "Add VPWR/VGND ports and connect cell power pins")
            .add_bool_arg("register_input", "Register the operands")
            .add_bool_arg("register_output", "Register the result")
    }

    fn add_output_args(self) -> Self {
        (self as clap::Command)
            .arg(
                Arg::new("output")
                    .long("output")
                    .value_name("OUTPUT_PATH")
                    .help("Write Verilog here instead of stdout")
                    .action(ArgAction::Set),
            )
            .add_bool_arg("stats", "Print summary statistics as JSON to stderr")
    }

    /// Adds a boolean argument to the command; every boolean flag takes an
    /// explicit `true` or `false`.
    fn add_bool_arg(self, long: &'static str, help: &'static str) -> Self {
        (self as clap::Command).arg(
            Arg::new(long)
                .long(long)
                .value_name("BOOL")
                .action(ArgAction::Set)
                .value_parser(["true", "false"])
                .num_args(1)
                .help(help),
        )
    }
}

fn main() {
    let _ = env_logger::try_init();

    log::info!(
        "arithgen-driver starting; version: {}",
        env!("CARGO_PKG_VERSION")
    );

    let matches = clap::Command::new("arithgen-driver")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generates adder and multiplier netlists")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("CONFIG")
                .help("Path to an arithgen.toml file with [generator] defaults")
                .action(ArgAction::Set),
        )
        .subcommand(clap::Command::new("version").about("Prints the version of the driver"))
        .subcommand(
            clap::Command::new("adder")
                .about("Generates a parallel-prefix adder")
                .add_generator_args()
                .add_output_args(),
        )
        .subcommand(
            clap::Command::new("multiplier")
                .about("Generates a Booth/Dadda multiplier or multiply-adder")
                .add_generator_args()
                .arg(
                    Arg::new("partial_products")
                        .long("partial_products")
                        .value_name("SCHEME")
                        .help(format!(
                            "Partial product scheme: booth or schoolbook (default {})",
                            *DEFAULT_PARTIAL_PRODUCTS
                        ))
                        .action(ArgAction::Set),
                )
                .add_bool_arg("multiply_add", "Add a 2N-bit addend port c")
                .add_bool_arg(
                    "register_middle",
                    "Register the partial products before reduction",
                )
                .add_output_args(),
        )
        .get_matches();

    let config = matches.get_one::<String>("config").map(|path| {
        match config::load_config(Path::new(path)) {
            Ok(config) => config,
            Err(e) => report_cli_error_and_exit(
                &format!("{:#}", e),
                None,
                vec![("config", path.as_str())],
            ),
        }
    });

    let result = if let Some(matches) = matches.subcommand_matches("adder") {
        gen_adder::handle_adder(matches, &config).map_err(|e| (e, "adder"))
    } else if let Some(matches) = matches.subcommand_matches("multiplier") {
        gen_multiplier::handle_multiplier(matches, &config).map_err(|e| (e, "multiplier"))
    } else if let Some(_matches) = matches.subcommand_matches("version") {
        println!("{}", env!("CARGO_PKG_VERSION"));
        Ok(())
    } else {
        report_cli_error_and_exit("No valid subcommand provided.", None, vec![]);
    };
    if let Err((message, subcommand)) = result {
        report_cli_error_and_exit(&message, Some(subcommand), vec![]);
    }
}
