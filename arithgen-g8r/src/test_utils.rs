// SPDX-License-Identifier: Apache-2.0

//! Stimulus and checking helpers shared by unit and integration tests.

use bitvec::field::BitField;
use bitvec::slice::BitSlice;
use bitvec::vec::BitVec;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::arith_error::NetlistError;
use crate::netlist::Netlist;
use crate::netlist_sim::{Simulator, LANES};

pub fn make_rng(seed: u64) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(seed)
}

pub fn mask(bit_count: usize) -> u128 {
    if bit_count >= 128 {
        u128::MAX
    } else {
        (1u128 << bit_count) - 1
    }
}

pub fn random_values(rng: &mut impl Rng, bit_count: usize, count: usize) -> Vec<u128> {
    (0..count).map(|_| rng.gen::<u128>() & mask(bit_count)).collect()
}

pub fn bits_from_u64(value: u64, bit_count: usize) -> BitVec {
    let mut bits: BitVec = BitVec::repeat(false, bit_count);
    for i in 0..bit_count.min(64) {
        bits.set(i, (value >> i) & 1 == 1);
    }
    bits
}

pub fn u64_from_bits(bits: &BitSlice) -> u64 {
    assert!(bits.len() <= 64);
    if bits.is_empty() {
        return 0;
    }
    bits.load_le::<u64>()
}

/// Applies one batch of named input samples, clocks `latency` times while
/// holding them, and returns the samples of output `output`.
pub fn simulate_batch(
    netlist: &Netlist,
    inputs: &[(&str, &[u128])],
    output: &str,
    latency: usize,
) -> Result<Vec<u128>, NetlistError> {
    let sample_count = inputs.first().map(|(_, v)| v.len()).unwrap_or(0);
    assert!(sample_count <= LANES);
    let mut sim = Simulator::new(netlist)?;
    for (name, values) in inputs {
        assert_eq!(values.len(), sample_count);
        sim.set_input_u128(name, values)?;
    }
    sim.settle();
    for _ in 0..latency {
        sim.step();
    }
    sim.get_output_u128(output, sample_count)
}

/// `simulate_batch` over arbitrarily many samples, 64 at a time.
pub fn simulate_all(
    netlist: &Netlist,
    inputs: &[(&str, Vec<u128>)],
    output: &str,
    latency: usize,
) -> Result<Vec<u128>, NetlistError> {
    let total = inputs.first().map(|(_, v)| v.len()).unwrap_or(0);
    let mut results = Vec::with_capacity(total);
    let mut start = 0;
    while start < total {
        let end = (start + LANES).min(total);
        let batch: Vec<(&str, &[u128])> = inputs
            .iter()
            .map(|(name, values)| (*name, &values[start..end]))
            .collect();
        results.extend(simulate_batch(netlist, &batch, output, latency)?);
        start = end;
    }
    Ok(results)
}
