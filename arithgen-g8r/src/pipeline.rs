// SPDX-License-Identifier: Apache-2.0

//! Top-level generators: wire up ports, optional register stages, and the
//! arithmetic passes into one finished `Netlist`.
//!
//! Multiplier dataflow:
//!
//! ```text
//! a, b, [c] -> [input regs] -> partial products -> [+ c] -> [middle regs]
//!           -> dadda -> prefix adder (2N) -> [output regs] -> o
//! ```
//!
//! Each enabled register stage adds exactly one cycle of latency.

use std::collections::HashMap;

use crate::arith_error::{ArithError, ConfigError};
use crate::booth::{gatify_partial_products, PartialProductScheme};
use crate::dadda::gatify_dadda_reduce;
use crate::gate_provider::GateProvider;
use crate::netlist::{Netlist, SignalRef};
use crate::netlist_builder::NetlistBuilder;
use crate::prefix_adder::{gatify_prefix_add, AdderAlgorithm};

#[derive(Debug, Clone)]
pub struct AdderOptions {
    pub bits: usize,
    pub algorithm: AdderAlgorithm,
    pub register_input: bool,
    pub register_output: bool,
    pub powered: bool,
    pub module_name: Option<String>,
}

impl Default for AdderOptions {
    fn default() -> Self {
        Self {
            bits: 32,
            algorithm: AdderAlgorithm::default(),
            register_input: false,
            register_output: false,
            powered: false,
            module_name: None,
        }
    }
}

impl AdderOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.algorithm.validate_width(self.bits)
    }

    pub fn latency(&self) -> usize {
        self.register_input as usize + self.register_output as usize
    }

    pub fn module_name(&self) -> String {
        self.module_name.clone().unwrap_or_else(|| "adder".to_string())
    }
}

#[derive(Debug, Clone)]
pub struct MultiplierOptions {
    pub bits: usize,
    pub partial_products: PartialProductScheme,
    pub final_adder: AdderAlgorithm,
    /// Adds a `2N`-bit addend port `c`; the result is `(a*b + c) mod 2^(2N)`.
    pub multiply_add: bool,
    pub register_input: bool,
    /// Registers the partial-product matrix before reduction.
    pub register_middle: bool,
    pub register_output: bool,
    pub powered: bool,
    pub module_name: Option<String>,
}

impl Default for MultiplierOptions {
    fn default() -> Self {
        Self {
            bits: 32,
            partial_products: PartialProductScheme::default(),
            final_adder: AdderAlgorithm::default(),
            multiply_add: false,
            register_input: false,
            register_middle: false,
            register_output: false,
            powered: false,
            module_name: None,
        }
    }
}

impl MultiplierOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.partial_products.validate_width(self.bits)?;
        self.final_adder.validate_width(2 * self.bits)
    }

    pub fn latency(&self) -> usize {
        self.register_input as usize + self.register_middle as usize + self.register_output as usize
    }

    pub fn module_name(&self) -> String {
        match &self.module_name {
            Some(name) => name.clone(),
            None if self.multiply_add => "multiply_adder".to_string(),
            None => "multiplier".to_string(),
        }
    }
}

/// Builds `o = (a + b) mod 2^N`.
pub fn generate_adder(
    options: &AdderOptions,
    provider: &dyn GateProvider,
) -> Result<Netlist, ArithError> {
    options.validate()?;
    let mut builder = NetlistBuilder::new(&options.module_name(), provider)?;
    builder.set_powered(options.powered);
    log::info!(
        "generating {}-bit {} adder with provider {}",
        options.bits,
        options.algorithm,
        builder.provider_name()
    );

    let a = builder.add_input("a", options.bits);
    let b = builder.add_input("b", options.bits);
    let (a, b) = if options.register_input {
        builder.set_scope(Some("in_reg"));
        let regs = (builder.add_register_vec(&a), builder.add_register_vec(&b));
        builder.set_scope(None);
        regs
    } else {
        (a, b)
    };

    let mut sum = gatify_prefix_add(&a, &b, options.algorithm, Some("add"), &mut builder)?;

    if options.register_output {
        builder.set_scope(Some("out_reg"));
        sum = builder.add_register_vec(&sum);
        builder.set_scope(None);
    }
    builder.add_output("o", sum);

    let netlist = builder.build()?;
    netlist.check_port_width("o", options.bits)?;
    Ok(netlist)
}

/// Builds `o = (a * b [+ c]) mod 2^(2N)`.
pub fn generate_multiplier(
    options: &MultiplierOptions,
    provider: &dyn GateProvider,
) -> Result<Netlist, ArithError> {
    options.validate()?;
    let bits = options.bits;
    let mut builder = NetlistBuilder::new(&options.module_name(), provider)?;
    builder.set_powered(options.powered);
    log::info!(
        "generating {}-bit {} multiplier (final adder {}, multiply_add {}) with provider {}",
        bits,
        options.partial_products,
        options.final_adder,
        options.multiply_add,
        builder.provider_name()
    );

    let mut a = builder.add_input("a", bits);
    let mut b = builder.add_input("b", bits);
    let mut c = if options.multiply_add {
        Some(builder.add_input("c", 2 * bits))
    } else {
        None
    };
    if options.register_input {
        builder.set_scope(Some("in_reg"));
        a = builder.add_register_vec(&a);
        b = builder.add_register_vec(&b);
        c = c.map(|c| builder.add_register_vec(&c));
        builder.set_scope(None);
    }

    let mut matrix = gatify_partial_products(options.partial_products, &a, &b, &mut builder)?;
    if let Some(c) = &c {
        for (column, bit) in c.iter_lsb_to_msb().enumerate() {
            matrix.push(column, *bit);
        }
    }
    // Anything at or above 2^(2N) cannot affect the result.
    matrix.truncate(2 * bits);

    if options.register_middle {
        builder.set_scope(Some("mid_reg"));
        // A signal may sit in several columns (Booth sign bits); register it
        // once.
        let mut registered: HashMap<SignalRef, SignalRef> = HashMap::new();
        matrix.map_in_place(|signal| {
            *registered
                .entry(signal)
                .or_insert_with(|| builder.add_register(signal))
        });
        builder.set_scope(None);
    }

    let (x, y) = gatify_dadda_reduce(&mut matrix, &mut builder);
    let mut product = gatify_prefix_add(&x, &y, options.final_adder, Some("final"), &mut builder)?;

    if options.register_output {
        builder.set_scope(Some("out_reg"));
        product = builder.add_register_vec(&product);
        builder.set_scope(None);
    }
    builder.add_output("o", product);

    let netlist = builder.build()?;
    netlist.check_port_width("o", 2 * bits)?;
    Ok(netlist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate_provider::InferredProvider;

    #[test]
    fn test_multiplier_validation() {
        let provider = InferredProvider::new();
        let odd = MultiplierOptions {
            bits: 7,
            ..Default::default()
        };
        assert_eq!(
            generate_multiplier(&odd, &provider).unwrap_err(),
            ArithError::Config(ConfigError::OddBoothWidth(7))
        );
        // 2N = 12 is not a power of two for the tree final adder.
        let six = MultiplierOptions {
            bits: 6,
            ..Default::default()
        };
        assert_eq!(
            six.validate(),
            Err(ConfigError::WidthNotPowerOfTwo {
                algorithm: "brentkung".to_string(),
                bit_count: 12,
            })
        );
        let six_inferred = MultiplierOptions {
            bits: 6,
            final_adder: AdderAlgorithm::Inferred,
            ..Default::default()
        };
        assert!(six_inferred.validate().is_ok());
    }

    #[test]
    fn test_module_names_and_ports() {
        let provider = InferredProvider::new();
        let options = MultiplierOptions {
            bits: 4,
            multiply_add: true,
            ..Default::default()
        };
        let netlist = generate_multiplier(&options, &provider).unwrap();
        assert_eq!(
            netlist.get_signature(),
            "fn multiply_adder(a: bits[4], b: bits[4], c: bits[8]) -> bits[8]"
        );
        assert!(netlist.clock.is_none());

        let adder = generate_adder(
            &AdderOptions {
                bits: 8,
                register_output: true,
                ..Default::default()
            },
            &provider,
        )
        .unwrap();
        assert_eq!(adder.get_signature(), "fn adder(a: bits[8], b: bits[8]) -> bits[8]");
        assert_eq!(adder.register_count(), 8);
        assert_eq!(adder.clock.as_deref(), Some("clk"));
    }

    #[test]
    fn test_latency_counts_enabled_stages() {
        let options = MultiplierOptions {
            register_input: true,
            register_output: true,
            ..Default::default()
        };
        assert_eq!(options.latency(), 2);
        assert_eq!(AdderOptions::default().latency(), 0);
    }
}
