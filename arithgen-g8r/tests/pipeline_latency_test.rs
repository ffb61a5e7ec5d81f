// SPDX-License-Identifier: Apache-2.0

//! Streams a fresh batch of operands every cycle into registered variants and
//! checks each output against the operands presented `latency` cycles ago.

use std::collections::HashSet;

use arithgen_g8r::gate_provider::{GateProvider, InferredProvider};
use arithgen_g8r::netlist::{Netlist, Primitive, SignalNode};
use arithgen_g8r::netlist_sim::{Simulator, LANES};
use arithgen_g8r::pipeline::{generate_adder, generate_multiplier, AdderOptions, MultiplierOptions};
use arithgen_g8r::sky130_cells::CellLibrary;
use arithgen_g8r::test_utils::{make_rng, mask, random_values};
use test_case::test_case;

const CYCLES: usize = 12;

/// Drives `inputs` (one set of lane values per cycle) and compares the output
/// at cycle `t` with `reference` applied to the inputs of cycle `t - latency`.
fn check_streaming(
    netlist: &Netlist,
    latency: usize,
    port_widths: &[(&str, usize)],
    reference: impl Fn(&[u128]) -> u128,
    seed: u64,
) {
    let mut rng = make_rng(seed);
    let cycles: Vec<Vec<Vec<u128>>> = (0..CYCLES)
        .map(|_| {
            port_widths
                .iter()
                .map(|(_, width)| random_values(&mut rng, *width, LANES))
                .collect()
        })
        .collect();

    let mut sim = Simulator::new(netlist).unwrap();
    for (t, values) in cycles.iter().enumerate() {
        for ((name, _), lanes) in port_widths.iter().zip(values.iter()) {
            sim.set_input_u128(name, lanes).unwrap();
        }
        sim.settle();
        if t >= latency {
            let got = sim.get_output_u128("o", LANES).unwrap();
            let presented = &cycles[t - latency];
            for lane in 0..LANES {
                let operands: Vec<u128> = presented.iter().map(|port| port[lane]).collect();
                assert_eq!(
                    got[lane],
                    reference(&operands),
                    "cycle {} lane {} operands {:x?}",
                    t,
                    lane,
                    operands
                );
            }
        }
        sim.clock();
    }
}

#[test_case(false, false, 0)]
#[test_case(true, false, 1)]
#[test_case(false, true, 1)]
#[test_case(true, true, 2)]
fn test_adder_latency(register_input: bool, register_output: bool, latency: usize) {
    let _ = env_logger::builder().is_test(true).try_init();
    let provider = InferredProvider::new();
    let options = AdderOptions {
        bits: 16,
        register_input,
        register_output,
        ..Default::default()
    };
    assert_eq!(options.latency(), latency);
    let netlist = generate_adder(&options, &provider).unwrap();
    check_streaming(
        &netlist,
        latency,
        &[("a", 16), ("b", 16)],
        |x| (x[0] + x[1]) & mask(16),
        latency as u64,
    );
}

#[test_case(false, false, false)]
#[test_case(true, false, false)]
#[test_case(false, true, false)]
#[test_case(false, false, true)]
#[test_case(true, true, true)]
fn test_multiply_add_latency(register_input: bool, register_middle: bool, register_output: bool) {
    let _ = env_logger::builder().is_test(true).try_init();
    let provider = InferredProvider::new();
    let options = MultiplierOptions {
        bits: 8,
        multiply_add: true,
        register_input,
        register_middle,
        register_output,
        ..Default::default()
    };
    let latency = options.latency();
    let netlist = generate_multiplier(&options, &provider).unwrap();
    check_streaming(
        &netlist,
        latency,
        &[("a", 8), ("b", 8), ("c", 16)],
        |x| (x[0] * x[1] + x[2]) & mask(16),
        0x1a7 + latency as u64,
    );
}

#[test]
fn test_sky130_pipelined_multiplier() {
    let provider: Box<dyn GateProvider> = Box::new(CellLibrary::sky130_hd());
    let options = MultiplierOptions {
        bits: 8,
        register_input: true,
        register_middle: true,
        register_output: true,
        powered: true,
        ..Default::default()
    };
    let netlist = generate_multiplier(&options, provider.as_ref()).unwrap();
    assert!(netlist.powered);
    check_streaming(
        &netlist,
        3,
        &[("a", 8), ("b", 8)],
        |x| x[0] * x[1],
        130,
    );
}

#[test]
fn test_middle_register_skips_constants_and_duplicates() {
    let provider = InferredProvider::new();
    let combinational = MultiplierOptions {
        bits: 8,
        ..Default::default()
    };
    let registered = MultiplierOptions {
        register_middle: true,
        ..combinational.clone()
    };
    let netlist = generate_multiplier(&registered, &provider).unwrap();
    let mid_regs = netlist
        .gates
        .iter()
        .filter(|g| g.name.starts_with("mid_reg_"))
        .count();
    assert_eq!(mid_regs, netlist.register_count());
    assert!(mid_regs > 0);
    let mut sampled = HashSet::new();
    for gate in netlist.gates.iter().filter(|g| g.primitive == Primitive::Dff) {
        let d = gate.inputs[0];
        assert!(
            !matches!(netlist.get(d), SignalNode::Literal(_)),
            "{} registers a constant",
            gate.name
        );
        assert!(sampled.insert(d), "{} duplicates a register", gate.name);
    }
    let plain = generate_multiplier(&combinational, &provider).unwrap();
    assert_eq!(plain.register_count(), 0);
}
