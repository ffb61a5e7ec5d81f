// SPDX-License-Identifier: Apache-2.0

//! Cycle-based, bit-parallel netlist interpreter.
//!
//! Every signal holds a `u64` where bit *l* is the value of that signal in
//! sample lane *l*, so one pass over the gates evaluates 64 independent
//! stimuli. Combinational gates are evaluated in topological order by
//! `settle`; `clock` latches every register at once.

use bitvec::vec::BitVec;

use crate::arith_error::NetlistError;
use crate::netlist::{Domain, Netlist, Primitive, SignalNode};
use crate::topo::comb_gate_order;

pub const LANES: usize = 64;

/// Evaluates one primitive over 64 lanes.
fn eval_primitive(primitive: Primitive, inputs: &[u64], outputs: &mut [u64]) {
    match primitive {
        Primitive::And2 => outputs[0] = inputs[0] & inputs[1],
        Primitive::Or2 => outputs[0] = inputs[0] | inputs[1],
        Primitive::Xor2 => outputs[0] = inputs[0] ^ inputs[1],
        Primitive::Inv => outputs[0] = !inputs[0],
        Primitive::HalfAdder => {
            outputs[0] = inputs[0] ^ inputs[1];
            outputs[1] = inputs[0] & inputs[1];
        }
        Primitive::FullAdder => {
            let (a, b, c) = (inputs[0], inputs[1], inputs[2]);
            outputs[0] = a ^ b ^ c;
            outputs[1] = (a & b) | (c & (a ^ b));
        }
        Primitive::Ao21 => outputs[0] = (inputs[0] & inputs[1]) | inputs[2],
        Primitive::Ao22 => outputs[0] = (inputs[0] & inputs[1]) | (inputs[2] & inputs[3]),
        Primitive::Ao32 => {
            outputs[0] = (inputs[0] & inputs[1] & inputs[2]) | (inputs[3] & inputs[4])
        }
        Primitive::Add => {
            let bit_count = outputs.len();
            let (lhs, rhs) = inputs.split_at(bit_count);
            let mut carry = 0u64;
            for i in 0..bit_count {
                let (a, b) = (lhs[i], rhs[i]);
                outputs[i] = a ^ b ^ carry;
                carry = (a & b) | (carry & (a ^ b));
            }
        }
        // Registers are handled by `clock`; evaluating one combinationally
        // would be a transparent latch.
        Primitive::Dff => outputs[0] = inputs[0],
    }
}

pub struct Simulator<'a> {
    netlist: &'a Netlist,
    order: Vec<usize>,
    registers: Vec<usize>,
    values: Vec<u64>,
}

impl<'a> Simulator<'a> {
    /// Registers power up to zero in every lane.
    pub fn new(netlist: &'a Netlist) -> Result<Self, NetlistError> {
        let order = comb_gate_order(netlist)?;
        let registers = netlist
            .gates
            .iter()
            .enumerate()
            .filter(|(_, g)| g.domain() == Domain::Sync)
            .map(|(i, _)| i)
            .collect();
        let values = netlist
            .signals
            .iter()
            .map(|node| match node {
                SignalNode::Literal(true) => u64::MAX,
                _ => 0,
            })
            .collect();
        Ok(Self {
            netlist,
            order,
            registers,
            values,
        })
    }

    /// Sets the input port `name`; `lanes[i]` carries bit `i` for all samples.
    pub fn set_input_lanes(&mut self, name: &str, lanes: &[u64]) -> Result<(), NetlistError> {
        let port = self
            .netlist
            .get_input_port(name)
            .ok_or_else(|| NetlistError::UnknownPort(name.to_string()))?;
        if port.get_bit_count() != lanes.len() {
            return Err(NetlistError::PortWidthMismatch {
                port: name.to_string(),
                expected: port.get_bit_count(),
                got: lanes.len(),
            });
        }
        for (bit, value) in port.bit_vector.iter_lsb_to_msb().zip(lanes.iter()) {
            self.values[bit.id] = *value;
        }
        Ok(())
    }

    /// Sets up to 64 samples of the input port `name`, one value per lane.
    pub fn set_input_u128(&mut self, name: &str, samples: &[u128]) -> Result<(), NetlistError> {
        assert!(samples.len() <= LANES, "at most {} samples per batch", LANES);
        let bit_count = self
            .netlist
            .get_input_port(name)
            .ok_or_else(|| NetlistError::UnknownPort(name.to_string()))?
            .get_bit_count();
        let lanes = pack_lanes(samples, bit_count);
        self.set_input_lanes(name, &lanes)
    }

    pub fn get_output_lanes(&self, name: &str) -> Result<Vec<u64>, NetlistError> {
        let port = self
            .netlist
            .get_output_port(name)
            .ok_or_else(|| NetlistError::UnknownPort(name.to_string()))?;
        Ok(port
            .bit_vector
            .iter_lsb_to_msb()
            .map(|bit| self.values[bit.id])
            .collect())
    }

    /// Returns the output port `name` for the first `sample_count` lanes.
    pub fn get_output_u128(
        &self,
        name: &str,
        sample_count: usize,
    ) -> Result<Vec<u128>, NetlistError> {
        let lanes = self.get_output_lanes(name)?;
        Ok(unpack_lanes(&lanes, sample_count))
    }

    /// Propagates current inputs and register state through the
    /// combinational logic.
    pub fn settle(&mut self) {
        let mut inputs: Vec<u64> = Vec::new();
        let mut outputs: Vec<u64> = Vec::new();
        for gate_index in self.order.iter() {
            let gate = &self.netlist.gates[*gate_index];
            inputs.clear();
            inputs.extend(gate.inputs.iter().map(|s| self.values[s.id]));
            outputs.clear();
            outputs.resize(gate.outputs.len(), 0);
            eval_primitive(gate.primitive, &inputs, &mut outputs);
            for (signal, value) in gate.outputs.iter().zip(outputs.iter()) {
                self.values[signal.id] = *value;
            }
        }
    }

    /// Rising clock edge: every register samples its input simultaneously.
    pub fn clock(&mut self) {
        let sampled: Vec<u64> = self
            .registers
            .iter()
            .map(|g| self.values[self.netlist.gates[*g].inputs[0].id])
            .collect();
        for (g, value) in self.registers.iter().zip(sampled) {
            self.values[self.netlist.gates[*g].outputs[0].id] = value;
        }
    }

    /// Settles, latches, and settles again so outputs reflect the new state.
    pub fn step(&mut self) {
        self.settle();
        self.clock();
        self.settle();
    }
}

/// Transposes per-sample values into per-bit lanes.
pub fn pack_lanes(samples: &[u128], bit_count: usize) -> Vec<u64> {
    let mut lanes = vec![0u64; bit_count];
    for (lane, sample) in samples.iter().enumerate() {
        for (bit, word) in lanes.iter_mut().enumerate() {
            if bit < 128 && (sample >> bit) & 1 == 1 {
                *word |= 1u64 << lane;
            }
        }
    }
    lanes
}

pub fn unpack_lanes(lanes: &[u64], sample_count: usize) -> Vec<u128> {
    assert!(lanes.len() <= 128, "port wider than 128 bits");
    (0..sample_count)
        .map(|lane| {
            lanes
                .iter()
                .enumerate()
                .fold(0u128, |acc, (bit, word)| {
                    acc | ((((word >> lane) & 1) as u128) << bit)
                })
        })
        .collect()
}

/// Evaluates a purely combinational netlist on a single sample; one `BitVec`
/// per input port in declaration order, one per output port in the result.
pub fn eval_combinational(
    netlist: &Netlist,
    inputs: &[BitVec],
) -> Result<Vec<BitVec>, NetlistError> {
    assert_eq!(inputs.len(), netlist.inputs.len());
    let mut sim = Simulator::new(netlist)?;
    for (port, value) in netlist.inputs.iter().zip(inputs.iter()) {
        let lanes: Vec<u64> = value.iter().map(|b| if *b { 1 } else { 0 }).collect();
        sim.set_input_lanes(&port.name, &lanes)?;
    }
    sim.settle();
    let mut results = Vec::with_capacity(netlist.outputs.len());
    for port in netlist.outputs.iter() {
        let lanes = sim.get_output_lanes(&port.name)?;
        results.push(lanes.iter().map(|word| word & 1 == 1).collect::<BitVec>());
    }
    Ok(results)
}
