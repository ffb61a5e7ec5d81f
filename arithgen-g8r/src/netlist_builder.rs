// SPDX-License-Identifier: Apache-2.0

//! The `NetlistBuilder` accumulates signals and gate instances for a single
//! generation run.
//!
//! Every primitive request goes through `request`, which asks the gate provider
//! for a realization and, when the provider has none, rewrites the request
//! into simpler primitives with the same boolean function:
//!
//! | primitive | decomposition |
//! |---|---|
//! | OR2(a,b) | INV(AND2(INV a, INV b)) |
//! | XOR2(a,b) | AO22(a, INV b, INV a, b) |
//! | AO21(a1,a2,b1) | OR2(AND2(a1,a2), b1) |
//! | AO22(a1,a2,b1,b2) | AO21(a1, a2, AND2(b1,b2)) |
//! | AO32(a1,a2,a3,b1,b2) | AO22(AND2(a1,a2), a3, b1, b2) |
//! | HA(a,b) | XOR2(a,b), AND2(a,b) |
//! | FA(a,b,c) | t=XOR2(a,b); XOR2(t,c), AO22(a,b,t,c) |
//! | ADD(a,b) | HA at bit 0, FA above, carry-out dropped |
//!
//! Basic example usage:
//! ```
//! use arithgen_g8r::gate_provider::InferredProvider;
//! use arithgen_g8r::netlist_builder::NetlistBuilder;
//!
//! let provider = InferredProvider::new();
//! let mut builder = NetlistBuilder::new("my_and_gate", &provider).unwrap();
//! let a = builder.add_input("a", 1);
//! let b = builder.add_input("b", 1);
//! let o = builder.add_and2(*a.get_lsb(0), *b.get_lsb(0));
//! builder.add_output("o", o.into());
//! let netlist = builder.build().unwrap();
//! assert_eq!(netlist.get_signature(), "fn my_and_gate(a: bits[1], b: bits[1]) -> bits[1]");
//! ```

use crate::arith_error::{ConfigError, NetlistError};
use crate::gate_provider::{check_provider_basis, GateProvider};
use crate::netlist::{
    BitVector, GateInstance, Netlist, Port, Primitive, SignalNode, SignalRef,
};

/// Net name used for the clock once the first register is requested.
pub const CLOCK_NET: &str = "clk";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfAdderOutput {
    pub sum: SignalRef,
    pub carry: SignalRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullAdderOutput {
    pub sum: SignalRef,
    pub carry: SignalRef,
}

pub struct NetlistBuilder<'a> {
    pub name: String,
    provider: &'a dyn GateProvider,
    signals: Vec<SignalNode>,
    gates: Vec<GateInstance>,
    inputs: Vec<Port>,
    outputs: Vec<Port>,
    scope: Option<String>,
    clock: Option<String>,
    powered: bool,
}

impl<'a> NetlistBuilder<'a> {
    /// Fails when the provider lacks one of the basis primitives, since
    /// decomposition could not terminate.
    pub fn new(name: &str, provider: &'a dyn GateProvider) -> Result<Self, ConfigError> {
        check_provider_basis(provider)?;
        Ok(Self {
            name: name.to_string(),
            provider,
            signals: vec![SignalNode::Literal(false), SignalNode::Literal(true)],
            gates: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            scope: None,
            clock: None,
            powered: false,
        })
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn set_powered(&mut self, powered: bool) {
        self.powered = powered;
    }

    /// Prefix for the names of subsequently created gates; `None` clears it.
    pub fn set_scope(&mut self, scope: Option<&str>) {
        self.scope = scope.map(|s| s.to_string());
    }

    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    pub fn get_false(&self) -> SignalRef {
        SignalRef { id: 0 }
    }

    pub fn get_true(&self) -> SignalRef {
        SignalRef { id: 1 }
    }

    pub fn is_literal(&self, signal: SignalRef) -> bool {
        matches!(self.signals[signal.id], SignalNode::Literal(_))
    }

    pub fn add_input(&mut self, name: &str, bit_count: usize) -> BitVector {
        let mut bits = Vec::with_capacity(bit_count);
        for lsb_index in 0..bit_count {
            bits.push(self.push_signal(SignalNode::Input {
                port: name.to_string(),
                lsb_index,
            }));
        }
        let bit_vector = BitVector::from(bits);
        self.inputs.push(Port {
            name: name.to_string(),
            bit_vector: bit_vector.clone(),
        });
        bit_vector
    }

    pub fn add_output(&mut self, name: &str, bit_vector: BitVector) {
        self.outputs.push(Port {
            name: name.to_string(),
            bit_vector,
        });
    }

    fn push_signal(&mut self, node: SignalNode) -> SignalRef {
        let signal = SignalRef {
            id: self.signals.len(),
        };
        self.signals.push(node);
        signal
    }

    fn new_wire(&mut self) -> SignalRef {
        let name = self.scope.clone();
        self.push_signal(SignalNode::Wire { name })
    }

    fn gate_name(&self, primitive: Primitive) -> String {
        match &self.scope {
            Some(scope) => format!("{}_{}_{}", scope, primitive.mnemonic(), self.gates.len()),
            None => format!("{}_{}", primitive.mnemonic(), self.gates.len()),
        }
    }

    /// Returns the output signals of `primitive` applied to `inputs`, realized
    /// natively or through decomposition.
    pub fn request(&mut self, primitive: Primitive, inputs: &[SignalRef]) -> Vec<SignalRef> {
        let output_count = match primitive.arity() {
            Some((input_count, output_count)) => {
                assert_eq!(
                    inputs.len(),
                    input_count,
                    "{} expects {} inputs",
                    primitive,
                    input_count
                );
                output_count
            }
            None => {
                assert!(
                    !inputs.is_empty() && inputs.len() % 2 == 0,
                    "{} expects two equal-width operands; got {} bits",
                    primitive,
                    inputs.len()
                );
                inputs.len() / 2
            }
        };
        match self.provider.realize(primitive) {
            Some(realization) => {
                let name = self.gate_name(primitive);
                let outputs: Vec<SignalRef> = (0..output_count).map(|_| self.new_wire()).collect();
                log::trace!("{} = {}({:?})", name, primitive, inputs);
                if primitive == Primitive::Dff && self.clock.is_none() {
                    self.clock = Some(CLOCK_NET.to_string());
                }
                self.gates.push(GateInstance {
                    name,
                    primitive,
                    inputs: inputs.to_vec(),
                    outputs: outputs.clone(),
                    realization,
                });
                outputs
            }
            None => self.decompose(primitive, inputs),
        }
    }

    fn request1(&mut self, primitive: Primitive, inputs: &[SignalRef]) -> SignalRef {
        self.request(primitive, inputs)[0]
    }

    fn decompose(&mut self, primitive: Primitive, inputs: &[SignalRef]) -> Vec<SignalRef> {
        log::trace!(
            "provider {} lacks {}; decomposing",
            self.provider.name(),
            primitive
        );
        match primitive {
            Primitive::Or2 => {
                let na = self.add_inv(inputs[0]);
                let nb = self.add_inv(inputs[1]);
                let nor = self.add_and2(na, nb);
                vec![self.add_inv(nor)]
            }
            Primitive::Xor2 => {
                let (a, b) = (inputs[0], inputs[1]);
                let na = self.add_inv(a);
                let nb = self.add_inv(b);
                vec![self.add_ao22(a, nb, na, b)]
            }
            Primitive::Ao21 => {
                let t = self.add_and2(inputs[0], inputs[1]);
                vec![self.add_or2(t, inputs[2])]
            }
            Primitive::Ao22 => {
                let t = self.add_and2(inputs[2], inputs[3]);
                vec![self.add_ao21(inputs[0], inputs[1], t)]
            }
            Primitive::Ao32 => {
                let t = self.add_and2(inputs[0], inputs[1]);
                vec![self.add_ao22(t, inputs[2], inputs[3], inputs[4])]
            }
            Primitive::HalfAdder => {
                let sum = self.add_xor2(inputs[0], inputs[1]);
                let carry = self.add_and2(inputs[0], inputs[1]);
                vec![sum, carry]
            }
            Primitive::FullAdder => {
                let (a, b, c) = (inputs[0], inputs[1], inputs[2]);
                let t = self.add_xor2(a, b);
                let sum = self.add_xor2(t, c);
                let carry = self.add_ao22(a, b, t, c);
                vec![sum, carry]
            }
            Primitive::Add => {
                let bit_count = inputs.len() / 2;
                let (lhs, rhs) = inputs.split_at(bit_count);
                let mut sum = Vec::with_capacity(bit_count);
                let first = self.add_half_adder(lhs[0], rhs[0]);
                sum.push(first.sum);
                let mut carry = first.carry;
                for i in 1..bit_count {
                    let fa = self.add_full_adder(lhs[i], rhs[i], carry);
                    sum.push(fa.sum);
                    carry = fa.carry;
                }
                sum
            }
            Primitive::And2 | Primitive::Inv | Primitive::Dff => {
                unreachable!("basis primitive {} was checked at construction", primitive)
            }
        }
    }

    pub fn add_and2(&mut self, a: SignalRef, b: SignalRef) -> SignalRef {
        self.request1(Primitive::And2, &[a, b])
    }

    pub fn add_or2(&mut self, a: SignalRef, b: SignalRef) -> SignalRef {
        self.request1(Primitive::Or2, &[a, b])
    }

    pub fn add_xor2(&mut self, a: SignalRef, b: SignalRef) -> SignalRef {
        self.request1(Primitive::Xor2, &[a, b])
    }

    pub fn add_inv(&mut self, a: SignalRef) -> SignalRef {
        self.request1(Primitive::Inv, &[a])
    }

    /// `(a1 & a2) | b1`
    pub fn add_ao21(&mut self, a1: SignalRef, a2: SignalRef, b1: SignalRef) -> SignalRef {
        self.request1(Primitive::Ao21, &[a1, a2, b1])
    }

    /// `(a1 & a2) | (b1 & b2)`
    pub fn add_ao22(
        &mut self,
        a1: SignalRef,
        a2: SignalRef,
        b1: SignalRef,
        b2: SignalRef,
    ) -> SignalRef {
        self.request1(Primitive::Ao22, &[a1, a2, b1, b2])
    }

    /// `(a1 & a2 & a3) | (b1 & b2)`
    pub fn add_ao32(
        &mut self,
        a1: SignalRef,
        a2: SignalRef,
        a3: SignalRef,
        b1: SignalRef,
        b2: SignalRef,
    ) -> SignalRef {
        self.request1(Primitive::Ao32, &[a1, a2, a3, b1, b2])
    }

    pub fn add_half_adder(&mut self, a: SignalRef, b: SignalRef) -> HalfAdderOutput {
        let outputs = self.request(Primitive::HalfAdder, &[a, b]);
        HalfAdderOutput {
            sum: outputs[0],
            carry: outputs[1],
        }
    }

    pub fn add_full_adder(&mut self, a: SignalRef, b: SignalRef, c: SignalRef) -> FullAdderOutput {
        let outputs = self.request(Primitive::FullAdder, &[a, b, c]);
        FullAdderOutput {
            sum: outputs[0],
            carry: outputs[1],
        }
    }

    /// Word-level `(lhs + rhs) mod 2^n`.
    pub fn add_add(&mut self, lhs: &BitVector, rhs: &BitVector) -> BitVector {
        assert_eq!(lhs.get_bit_count(), rhs.get_bit_count());
        let inputs: Vec<SignalRef> = lhs
            .iter_lsb_to_msb()
            .chain(rhs.iter_lsb_to_msb())
            .cloned()
            .collect();
        BitVector::from(self.request(Primitive::Add, &inputs))
    }

    /// One-cycle delay of `d`. Literals never change, so they pass through
    /// unregistered.
    pub fn add_register(&mut self, d: SignalRef) -> SignalRef {
        if self.is_literal(d) {
            return d;
        }
        self.request1(Primitive::Dff, &[d])
    }

    pub fn add_register_vec(&mut self, d: &BitVector) -> BitVector {
        let bits: Vec<SignalRef> = d
            .iter_lsb_to_msb()
            .map(|bit| self.add_register(*bit))
            .collect();
        BitVector::from(bits)
    }

    /// Finalizes the netlist, failing if any signal has a missing or duplicate
    /// driver.
    pub fn build(self) -> Result<Netlist, NetlistError> {
        let netlist = Netlist {
            name: self.name,
            inputs: self.inputs,
            outputs: self.outputs,
            signals: self.signals,
            gates: self.gates,
            clock: self.clock,
            powered: self.powered,
        };
        netlist.check_drivers()?;
        log::debug!(
            "built {} with {} gates over {} signals",
            netlist.name,
            netlist.gates.len(),
            netlist.signals.len()
        );
        Ok(netlist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate_provider::{InferredProvider, BASIS_PRIMITIVES};
    use crate::netlist::Realization;
    use crate::netlist_sim::eval_combinational;
    use crate::test_utils::{bits_from_u64, u64_from_bits};
    use bitvec::vec::BitVec;
    use test_case::test_case;

    /// Builds a single-primitive netlist and returns its truth table with the
    /// first input as the least significant index bit.
    fn truth_table(provider: &dyn GateProvider, primitive: Primitive) -> Vec<Vec<bool>> {
        let (input_count, _) = primitive.arity().unwrap();
        let mut builder = NetlistBuilder::new("tt", provider).unwrap();
        let inputs: Vec<SignalRef> = (0..input_count)
            .map(|i| *builder.add_input(&format!("i{}", i), 1).get_lsb(0))
            .collect();
        let outputs = builder.request(primitive, &inputs);
        for (i, o) in outputs.iter().enumerate() {
            builder.add_output(&format!("o{}", i), BitVector::from_bit(*o));
        }
        let netlist = builder.build().unwrap();
        let mut table = Vec::new();
        for pattern in 0..(1u32 << input_count) {
            let args: Vec<BitVec> = (0..input_count)
                .map(|i| BitVec::repeat((pattern >> i) & 1 == 1, 1))
                .collect();
            let results = eval_combinational(&netlist, &args).unwrap();
            table.push(results.iter().map(|r| r[0]).collect());
        }
        table
    }

    #[test_case(Primitive::Or2; "or2")]
    #[test_case(Primitive::Xor2; "xor2")]
    #[test_case(Primitive::Ao21; "ao21")]
    #[test_case(Primitive::Ao22; "ao22")]
    #[test_case(Primitive::Ao32; "ao32")]
    #[test_case(Primitive::HalfAdder; "half_adder")]
    #[test_case(Primitive::FullAdder; "full_adder")]
    fn test_decomposition_preserves_function(primitive: Primitive) {
        let _ = env_logger::builder().is_test(true).try_init();
        let native = InferredProvider::new();
        let basis_only = InferredProvider::with_only(&BASIS_PRIMITIVES);
        assert_eq!(
            truth_table(&native, primitive),
            truth_table(&basis_only, primitive)
        );
    }

    #[test]
    fn test_basis_only_netlist_uses_basis_gates() {
        let provider = InferredProvider::with_only(&BASIS_PRIMITIVES);
        let mut builder = NetlistBuilder::new("fa", &provider).unwrap();
        let a = *builder.add_input("a", 1).get_lsb(0);
        let b = *builder.add_input("b", 1).get_lsb(0);
        let c = *builder.add_input("c", 1).get_lsb(0);
        let fa = builder.add_full_adder(a, b, c);
        builder.add_output("sum", fa.sum.into());
        builder.add_output("carry", fa.carry.into());
        let netlist = builder.build().unwrap();
        for gate in netlist.gates.iter() {
            assert!(
                gate.primitive == Primitive::And2 || gate.primitive == Primitive::Inv,
                "unexpected {}",
                gate.primitive
            );
            assert_eq!(gate.realization, Realization::Inferred);
        }
    }

    #[test]
    fn test_ripple_add_decomposition() {
        let provider = InferredProvider::with_only(&[
            Primitive::And2,
            Primitive::Inv,
            Primitive::Dff,
            Primitive::HalfAdder,
            Primitive::FullAdder,
        ]);
        let mut builder = NetlistBuilder::new("add4", &provider).unwrap();
        let a = builder.add_input("a", 4);
        let b = builder.add_input("b", 4);
        let sum = builder.add_add(&a, &b);
        builder.add_output("o", sum);
        let netlist = builder.build().unwrap();
        let ha = netlist
            .gates
            .iter()
            .filter(|g| g.primitive == Primitive::HalfAdder)
            .count();
        let fa = netlist
            .gates
            .iter()
            .filter(|g| g.primitive == Primitive::FullAdder)
            .count();
        assert_eq!((ha, fa), (1, 3));
        for (x, y) in [(0u64, 0u64), (7, 9), (15, 15), (8, 8)] {
            let args = vec![bits_from_u64(x, 4), bits_from_u64(y, 4)];
            let got = eval_combinational(&netlist, &args).unwrap();
            assert_eq!(u64_from_bits(&got[0]), (x + y) & 0xf);
        }
    }

    #[test]
    fn test_register_passes_literals_through() {
        let provider = InferredProvider::new();
        let mut builder = NetlistBuilder::new("r", &provider).unwrap();
        let a = *builder.add_input("a", 1).get_lsb(0);
        let one = builder.get_true();
        assert_eq!(builder.add_register(one), one);
        let q = builder.add_register(a);
        assert_ne!(q, a);
        builder.add_output("o", q.into());
        let netlist = builder.build().unwrap();
        assert_eq!(netlist.register_count(), 1);
        assert_eq!(netlist.clock.as_deref(), Some(CLOCK_NET));
    }

    #[test]
    fn test_scoped_gate_names_are_unique() {
        let provider = InferredProvider::new();
        let mut builder = NetlistBuilder::new("s", &provider).unwrap();
        let a = *builder.add_input("a", 1).get_lsb(0);
        builder.set_scope(Some("pre"));
        let x = builder.add_inv(a);
        let y = builder.add_inv(x);
        builder.set_scope(None);
        let z = builder.add_and2(x, y);
        builder.add_output("o", z.into());
        let netlist = builder.build().unwrap();
        let names: Vec<&str> = netlist.gates.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["pre_inv_0", "pre_inv_1", "and2_2"]);
    }

    #[test]
    fn test_build_reports_undriven_output() {
        let provider = InferredProvider::new();
        let mut builder = NetlistBuilder::new("bad", &provider).unwrap();
        let a = *builder.add_input("a", 1).get_lsb(0);
        let x = builder.add_inv(a);
        builder.add_output("o", x.into());
        let mut netlist = builder.build().unwrap();
        // Drop the driver and re-check.
        netlist.gates.clear();
        assert_eq!(
            netlist.check_drivers(),
            Err(NetlistError::UndrivenSignal {
                signal: x,
                reader: "output o[0]".to_string(),
            })
        );
    }

    #[test]
    fn test_build_reports_multiply_driven() {
        let provider = InferredProvider::new();
        let mut builder = NetlistBuilder::new("bad", &provider).unwrap();
        let a = *builder.add_input("a", 1).get_lsb(0);
        let x = builder.add_inv(a);
        builder.add_output("o", x.into());
        let mut netlist = builder.build().unwrap();
        let mut dup = netlist.gates[0].clone();
        dup.name = "dup".to_string();
        netlist.gates.push(dup);
        assert!(matches!(
            netlist.check_drivers(),
            Err(NetlistError::MultiplyDrivenSignal { .. })
        ));
    }

    #[test]
    fn test_new_rejects_provider_without_basis() {
        let provider = InferredProvider::with_only(&[Primitive::And2, Primitive::Inv]);
        assert!(matches!(
            NetlistBuilder::new("x", &provider),
            Err(ConfigError::MissingBasisPrimitive {
                primitive: Primitive::Dff,
                ..
            })
        ));
    }
}
