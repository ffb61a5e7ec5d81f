// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use serde::Serialize;

use crate::arith_error::NetlistError;
use crate::netlist::{Netlist, Realization};
use crate::topo::signal_depths;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SummaryStats {
    pub total_gates: usize,
    pub registers: usize,
    /// Gates bound to technology cells rather than inferred.
    pub cells: usize,
    /// Keyed by primitive mnemonic.
    pub by_primitive: BTreeMap<String, usize>,
    /// Longest chain of combinational gates between sources (inputs, literals,
    /// register outputs) and sinks (outputs, register inputs).
    pub comb_depth: usize,
}

pub fn get_summary_stats(netlist: &Netlist) -> Result<SummaryStats, NetlistError> {
    let mut by_primitive: BTreeMap<String, usize> = BTreeMap::new();
    for gate in netlist.gates.iter() {
        *by_primitive
            .entry(gate.primitive.mnemonic().to_string())
            .or_insert(0) += 1;
    }
    let cells = netlist
        .gates
        .iter()
        .filter(|g| matches!(g.realization, Realization::Cell(_)))
        .count();
    let depths = signal_depths(netlist)?;
    let comb_depth = depths.iter().cloned().max().unwrap_or(0);
    log::debug!("{}: comb depth {}", netlist.name, comb_depth);
    Ok(SummaryStats {
        total_gates: netlist.gates.len(),
        registers: netlist.register_count(),
        cells,
        by_primitive,
        comb_depth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate_provider::InferredProvider;
    use crate::netlist_builder::NetlistBuilder;

    #[test]
    fn test_summary_stats_counts() {
        let provider = InferredProvider::new();
        let mut builder = NetlistBuilder::new("s", &provider).unwrap();
        let a = *builder.add_input("a", 1).get_lsb(0);
        let b = *builder.add_input("b", 1).get_lsb(0);
        let x = builder.add_xor2(a, b);
        let y = builder.add_and2(x, a);
        let q = builder.add_register(y);
        let z = builder.add_inv(q);
        builder.add_output("o", z.into());
        let netlist = builder.build().unwrap();
        let stats = get_summary_stats(&netlist).unwrap();
        assert_eq!(stats.total_gates, 4);
        assert_eq!(stats.registers, 1);
        assert_eq!(stats.cells, 0);
        assert_eq!(stats.comb_depth, 2);
        assert_eq!(stats.by_primitive.get("xor2"), Some(&1));
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"comb_depth\":2"));
    }
}
