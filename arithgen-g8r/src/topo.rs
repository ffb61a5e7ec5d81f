// SPDX-License-Identifier: Apache-2.0

use std::collections::{HashMap, VecDeque};

use crate::arith_error::NetlistError;
use crate::netlist::{Domain, Netlist, SignalNode, SignalRef};

/// Returns the indices of all combinational gates in an order where every gate
/// appears after the gates driving its inputs.
///
/// Primary inputs, literals and register outputs are sources; registers are
/// cut points so sequential feedback is not a loop. A combinational cycle
/// leaves gates that can never become ready and is reported as an error.
pub fn comb_gate_order(netlist: &Netlist) -> Result<Vec<usize>, NetlistError> {
    let drivers = netlist.driver_map()?;

    // Number of not-yet-available inputs per combinational gate.
    let mut pending: Vec<usize> = vec![0; netlist.gates.len()];
    let mut readers: HashMap<SignalRef, Vec<usize>> = HashMap::new();
    let mut worklist: VecDeque<usize> = VecDeque::new();
    let mut comb_count = 0;

    for (gate_index, gate) in netlist.gates.iter().enumerate() {
        if gate.domain() != Domain::Comb {
            continue;
        }
        comb_count += 1;
        for input in gate.inputs.iter() {
            let from_comb = match netlist.get(*input) {
                SignalNode::Wire { .. } => drivers
                    .get(input)
                    .map(|d| netlist.gates[*d].domain() == Domain::Comb)
                    .unwrap_or(false),
                _ => false,
            };
            if from_comb {
                pending[gate_index] += 1;
                readers.entry(*input).or_default().push(gate_index);
            }
        }
        if pending[gate_index] == 0 {
            worklist.push_back(gate_index);
        }
    }

    let mut order = Vec::with_capacity(comb_count);
    while let Some(gate_index) = worklist.pop_front() {
        order.push(gate_index);
        for output in netlist.gates[gate_index].outputs.iter() {
            let Some(waiting) = readers.get(output) else {
                continue;
            };
            for reader in waiting.iter() {
                pending[*reader] -= 1;
                if pending[*reader] == 0 {
                    worklist.push_back(*reader);
                }
            }
        }
    }

    if order.len() != comb_count {
        return Err(NetlistError::CombinationalLoop {
            stuck_gates: comb_count - order.len(),
        });
    }
    Ok(order)
}

/// Combinational depth of every signal: sources are depth 0, a gate output is
/// one more than its deepest input.
pub fn signal_depths(netlist: &Netlist) -> Result<Vec<usize>, NetlistError> {
    let order = comb_gate_order(netlist)?;
    let mut depths = vec![0usize; netlist.signals.len()];
    for gate_index in order {
        let gate = &netlist.gates[gate_index];
        let depth = 1 + gate
            .inputs
            .iter()
            .map(|input| depths[input.id])
            .max()
            .unwrap_or(0);
        for output in gate.outputs.iter() {
            depths[output.id] = depth;
        }
    }
    Ok(depths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate_provider::InferredProvider;
    use crate::netlist::{GateInstance, Primitive, Realization};
    use crate::netlist_builder::NetlistBuilder;

    #[test]
    fn test_order_respects_dependencies() {
        let provider = InferredProvider::new();
        let mut builder = NetlistBuilder::new("chain", &provider).unwrap();
        let a = *builder.add_input("a", 1).get_lsb(0);
        let x = builder.add_inv(a);
        let y = builder.add_inv(x);
        let q = builder.add_register(y);
        let z = builder.add_and2(q, x);
        builder.add_output("o", z.into());
        let netlist = builder.build().unwrap();
        let order = comb_gate_order(&netlist).unwrap();
        assert_eq!(order, vec![0, 1, 3]);
        let depths = signal_depths(&netlist).unwrap();
        assert_eq!(depths[y.id], 2);
        assert_eq!(depths[q.id], 0);
        assert_eq!(depths[z.id], 2);
    }

    #[test]
    fn test_combinational_loop_is_reported() {
        let provider = InferredProvider::new();
        let mut builder = NetlistBuilder::new("loop", &provider).unwrap();
        let a = *builder.add_input("a", 1).get_lsb(0);
        let x = builder.add_inv(a);
        builder.add_output("o", x.into());
        let mut netlist = builder.build().unwrap();
        // Rewire the inverter to read its own output.
        netlist.gates[0].inputs = vec![x];
        assert_eq!(
            comb_gate_order(&netlist),
            Err(NetlistError::CombinationalLoop { stuck_gates: 1 })
        );

        // The same feedback through a register is fine.
        let q = SignalRef {
            id: netlist.signals.len(),
        };
        netlist.signals.push(SignalNode::Wire { name: None });
        netlist.gates[0].inputs = vec![q];
        netlist.gates.push(GateInstance {
            name: "dff_1".to_string(),
            primitive: Primitive::Dff,
            inputs: vec![x],
            outputs: vec![q],
            realization: Realization::Inferred,
        });
        assert_eq!(comb_gate_order(&netlist), Ok(vec![0]));
    }
}
