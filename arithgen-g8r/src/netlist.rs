// SPDX-License-Identifier: Apache-2.0

//! Technology-independent gate/signal graph.
//!
//! Signals live in an arena (`Netlist::signals`) and are addressed by
//! `SignalRef` handles. Gates refer to signals by handle only; a gate's
//! `realization` records whether the provider inferred the primitive as a
//! boolean expression or bound it to a named cell.

use std::collections::HashMap;
use std::fmt;

use crate::arith_error::NetlistError;

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct SignalRef {
    pub id: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalNode {
    Input {
        port: String,
        /// Index where 0 is the least significant bit of the input.
        lsb_index: usize,
    },
    Literal(bool),
    /// Driven by exactly one gate output. The name is debug metadata only.
    Wire { name: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitVector {
    /// Index 0 is the LSb, the last index is the MSb.
    bits: Vec<SignalRef>,
}

impl BitVector {
    pub fn from_lsb_is_index_0(bits: &[SignalRef]) -> Self {
        Self {
            bits: bits.to_vec(),
        }
    }

    pub fn from_bit(bit: SignalRef) -> Self {
        Self { bits: vec![bit] }
    }

    pub fn get_lsb(&self, index: usize) -> &SignalRef {
        assert!(
            index < self.bits.len(),
            "index {} is out of bounds for bit vector of length {}",
            index,
            self.bits.len()
        );
        &self.bits[index]
    }

    pub fn get_bit_count(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn iter_lsb_to_msb(&self) -> impl DoubleEndedIterator<Item = &SignalRef> {
        self.bits.iter()
    }

    /// Returns `bit_width` bits starting at `start`.
    pub fn get_lsb_slice(&self, start: usize, bit_width: usize) -> Self {
        Self {
            bits: self.bits.iter().skip(start).take(bit_width).cloned().collect(),
        }
    }
}

impl From<SignalRef> for BitVector {
    fn from(bit: SignalRef) -> Self {
        Self { bits: vec![bit] }
    }
}

impl From<Vec<SignalRef>> for BitVector {
    fn from(bits: Vec<SignalRef>) -> Self {
        Self { bits }
    }
}

/// A named top-level port. Inputs and outputs share this shape.
#[derive(Debug, Clone)]
pub struct Port {
    pub name: String,
    pub bit_vector: BitVector,
}

impl Port {
    pub fn get_bit_count(&self) -> usize {
        self.bit_vector.get_bit_count()
    }

    fn to_string(&self) -> String {
        let bits = self
            .bit_vector
            .iter_lsb_to_msb()
            .map(|bit| format!("%{}", bit.id))
            .collect::<Vec<String>>()
            .join(", ");
        format!("{}: bits[{}] = [{}]", self.name, self.get_bit_count(), bits)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Comb,
    /// Sampled on the rising clock edge.
    Sync,
}

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum Primitive {
    And2,
    Or2,
    Xor2,
    Inv,
    /// Outputs are `[sum, carry]`.
    HalfAdder,
    /// Outputs are `[sum, carry]`.
    FullAdder,
    /// `(a1 & a2) | b1`
    Ao21,
    /// `(a1 & a2) | (b1 & b2)`
    Ao22,
    /// `(a1 & a2 & a3) | (b1 & b2)`
    Ao32,
    /// Word-level adder: inputs are `lhs[n] ++ rhs[n]`, outputs `sum[n]`.
    Add,
    Dff,
}

impl Primitive {
    pub const ALL: [Primitive; 11] = [
        Primitive::And2,
        Primitive::Or2,
        Primitive::Xor2,
        Primitive::Inv,
        Primitive::HalfAdder,
        Primitive::FullAdder,
        Primitive::Ao21,
        Primitive::Ao22,
        Primitive::Ao32,
        Primitive::Add,
        Primitive::Dff,
    ];

    /// Returns `(input_count, output_count)`; `None` for the width-polymorphic
    /// `Add`.
    pub fn arity(&self) -> Option<(usize, usize)> {
        match self {
            Primitive::And2 | Primitive::Or2 | Primitive::Xor2 => Some((2, 1)),
            Primitive::Inv | Primitive::Dff => Some((1, 1)),
            Primitive::HalfAdder => Some((2, 2)),
            Primitive::FullAdder => Some((3, 2)),
            Primitive::Ao21 => Some((3, 1)),
            Primitive::Ao22 => Some((4, 1)),
            Primitive::Ao32 => Some((5, 1)),
            Primitive::Add => None,
        }
    }

    /// Whether `inputs`/`outputs` counts are legal for this primitive.
    pub fn accepts(&self, inputs: usize, outputs: usize) -> bool {
        match self.arity() {
            Some(expected) => expected == (inputs, outputs),
            None => outputs > 0 && inputs == 2 * outputs,
        }
    }

    pub fn domain(&self) -> Domain {
        match self {
            Primitive::Dff => Domain::Sync,
            _ => Domain::Comb,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Primitive::And2 => "and2",
            Primitive::Or2 => "or2",
            Primitive::Xor2 => "xor2",
            Primitive::Inv => "inv",
            Primitive::HalfAdder => "ha",
            Primitive::FullAdder => "fa",
            Primitive::Ao21 => "ao21",
            Primitive::Ao22 => "ao22",
            Primitive::Ao32 => "ao32",
            Primitive::Add => "add",
            Primitive::Dff => "dff",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// Structural binding of a primitive to a technology cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellBinding {
    pub cell: String,
    /// One pin per primitive input, in primitive input order.
    pub input_pins: Vec<String>,
    /// One pin per primitive output, in primitive output order.
    pub output_pins: Vec<String>,
    pub clock_pin: Option<String>,
    /// `(pin, rail)` pairs, connected only when the netlist is powered.
    pub power_pins: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Realization {
    /// The primitive's boolean function is emitted as an expression.
    Inferred,
    Cell(CellBinding),
}

#[derive(Debug, Clone)]
pub struct GateInstance {
    /// Stable and unique within one netlist.
    pub name: String,
    pub primitive: Primitive,
    pub inputs: Vec<SignalRef>,
    pub outputs: Vec<SignalRef>,
    pub realization: Realization,
}

impl GateInstance {
    pub fn domain(&self) -> Domain {
        self.primitive.domain()
    }
}

#[derive(Debug, Clone)]
pub struct Netlist {
    pub name: String,
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
    pub signals: Vec<SignalNode>,
    pub gates: Vec<GateInstance>,
    /// Name of the clock net; present iff the netlist contains registers.
    pub clock: Option<String>,
    /// Whether VPWR/VGND rails are part of the module interface.
    pub powered: bool,
}

impl Netlist {
    pub fn get(&self, signal: SignalRef) -> &SignalNode {
        &self.signals[signal.id]
    }

    pub fn get_input_port(&self, name: &str) -> Option<&Port> {
        self.inputs.iter().find(|p| p.name == name)
    }

    pub fn get_output_port(&self, name: &str) -> Option<&Port> {
        self.outputs.iter().find(|p| p.name == name)
    }

    pub fn register_count(&self) -> usize {
        self.gates
            .iter()
            .filter(|g| g.domain() == Domain::Sync)
            .count()
    }

    /// Human readable name for a signal, used by textual dumps and emitters.
    pub fn signal_name(&self, signal: SignalRef) -> String {
        match self.get(signal) {
            SignalNode::Input { port, lsb_index } => format!("{}[{}]", port, lsb_index),
            SignalNode::Literal(value) => format!("literal({})", value),
            SignalNode::Wire { name: Some(name) } => format!("{}_{}", name, signal.id),
            SignalNode::Wire { name: None } => format!("n{}", signal.id),
        }
    }

    pub fn get_signature(&self) -> String {
        let params_str = self
            .inputs
            .iter()
            .map(|input| format!("{}: bits[{}]", input.name, input.get_bit_count()))
            .collect::<Vec<String>>()
            .join(", ");
        let outputs_str = if self.outputs.len() == 1 {
            format!("bits[{}]", self.outputs[0].get_bit_count())
        } else {
            let guts = self
                .outputs
                .iter()
                .map(|output| format!("bits[{}]", output.get_bit_count()))
                .collect::<Vec<String>>()
                .join(", ");
            format!("({})", guts)
        };
        format!("fn {}({}) -> {}", self.name, params_str, outputs_str)
    }

    pub fn check_port_width(&self, port: &str, expected: usize) -> Result<(), NetlistError> {
        let found = self
            .get_output_port(port)
            .or_else(|| self.get_input_port(port))
            .ok_or_else(|| NetlistError::UnknownPort(port.to_string()))?;
        if found.get_bit_count() != expected {
            return Err(NetlistError::PortWidthMismatch {
                port: port.to_string(),
                expected,
                got: found.get_bit_count(),
            });
        }
        Ok(())
    }

    /// Maps every wire to the index of the gate that drives it.
    ///
    /// Fails if a gate drives an input or literal, or if two gates drive the
    /// same wire.
    pub fn driver_map(&self) -> Result<HashMap<SignalRef, usize>, NetlistError> {
        let mut drivers: HashMap<SignalRef, usize> = HashMap::new();
        for (gate_index, gate) in self.gates.iter().enumerate() {
            for output in gate.outputs.iter() {
                self.check_in_bounds(*output)?;
                match self.get(*output) {
                    SignalNode::Wire { .. } => {}
                    _ => {
                        return Err(NetlistError::DrivenSource {
                            signal: *output,
                            gate: gate.name.clone(),
                        });
                    }
                }
                if let Some(previous) = drivers.insert(*output, gate_index) {
                    return Err(NetlistError::MultiplyDrivenSignal {
                        signal: *output,
                        first: self.gates[previous].name.clone(),
                        second: gate.name.clone(),
                    });
                }
            }
        }
        Ok(drivers)
    }

    /// Checks that every wire read by a gate or an output port has exactly one
    /// driver and that every gate has a legal arity.
    pub fn check_drivers(&self) -> Result<(), NetlistError> {
        let drivers = self.driver_map()?;
        let check_read = |signal: SignalRef, reader: &str| -> Result<(), NetlistError> {
            self.check_in_bounds(signal)?;
            if let SignalNode::Wire { .. } = self.get(signal) {
                if !drivers.contains_key(&signal) {
                    return Err(NetlistError::UndrivenSignal {
                        signal,
                        reader: reader.to_string(),
                    });
                }
            }
            Ok(())
        };
        for gate in self.gates.iter() {
            if !gate.primitive.accepts(gate.inputs.len(), gate.outputs.len()) {
                return Err(NetlistError::Arity {
                    gate: gate.name.clone(),
                    primitive: gate.primitive,
                    inputs: gate.inputs.len(),
                    outputs: gate.outputs.len(),
                });
            }
            for input in gate.inputs.iter() {
                check_read(*input, &gate.name)?;
            }
        }
        for output in self.outputs.iter() {
            for (i, bit) in output.bit_vector.iter_lsb_to_msb().enumerate() {
                check_read(*bit, &format!("output {}[{}]", output.name, i))?;
            }
        }
        Ok(())
    }

    fn check_in_bounds(&self, signal: SignalRef) -> Result<(), NetlistError> {
        if signal.id >= self.signals.len() {
            return Err(NetlistError::SignalOutOfBounds {
                signal,
                signal_count: self.signals.len(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Netlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let input_str = self
            .inputs
            .iter()
            .map(|input| input.to_string())
            .collect::<Vec<String>>()
            .join(", ");
        let output_str = self
            .outputs
            .iter()
            .map(|output| output.to_string())
            .collect::<Vec<String>>()
            .join(", ");
        writeln!(f, "fn {}({}) -> ({}) {{", self.name, input_str, output_str)?;
        for (id, node) in self.signals.iter().enumerate() {
            if let SignalNode::Literal(value) = node {
                writeln!(f, "  %{} = literal({})", id, value)?;
            }
        }
        for gate in self.gates.iter() {
            let operand_str = |signal: &SignalRef| match self.get(*signal) {
                SignalNode::Input { port, lsb_index } => format!("{}[{}]", port, lsb_index),
                _ => format!("%{}", signal.id),
            };
            let outs = gate
                .outputs
                .iter()
                .map(|o| format!("%{}", o.id))
                .collect::<Vec<String>>()
                .join(", ");
            let ins = gate
                .inputs
                .iter()
                .map(operand_str)
                .collect::<Vec<String>>()
                .join(", ");
            let cell_str = match &gate.realization {
                Realization::Inferred => String::new(),
                Realization::Cell(binding) => format!(", cell={}", binding.cell),
            };
            writeln!(
                f,
                "  {} = {}({}, name={}{})",
                outs, gate.primitive, ins, gate.name, cell_str
            )?;
        }
        for output in self.outputs.iter() {
            for (i, bit) in output.bit_vector.iter_lsb_to_msb().enumerate() {
                writeln!(f, "  {}[{}] = %{}", output.name, i, bit.id)?;
            }
        }
        write!(f, "}}")
    }
}
