// SPDX-License-Identifier: Apache-2.0

//! Netlist generators for parallel-prefix adders and Booth/Dadda multipliers.

pub mod arith_error;
pub mod booth;
pub mod dadda;
pub mod emit_netlist;
pub mod gate_provider;
pub mod get_summary_stats;
pub mod netlist;
pub mod netlist_builder;
pub mod netlist_sim;
pub mod pipeline;
pub mod pp_matrix;
pub mod prefix_adder;
pub mod sky130_cells;
pub mod test_utils;
pub mod topo;
