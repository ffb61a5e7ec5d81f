// SPDX-License-Identifier: Apache-2.0

//! Renders a `Netlist` as a structural Verilog module.
//!
//! Inferred gates become continuous assignments (or `always` blocks for
//! registers); cell-bound gates become instances with named pin connections.

use std::fmt::Write;

use crate::netlist::{
    CellBinding, GateInstance, Netlist, Primitive, Realization, SignalNode, SignalRef,
};

fn expr(netlist: &Netlist, signal: SignalRef) -> String {
    match netlist.get(signal) {
        SignalNode::Literal(false) => "1'b0".to_string(),
        SignalNode::Literal(true) => "1'b1".to_string(),
        _ => netlist.signal_name(signal),
    }
}

fn concat_msb_first(netlist: &Netlist, bits: &[SignalRef]) -> String {
    let parts: Vec<String> = bits.iter().rev().map(|s| expr(netlist, *s)).collect();
    format!("{{{}}}", parts.join(", "))
}

fn emit_inferred(netlist: &Netlist, gate: &GateInstance, clock: &str, out: &mut String) {
    let i: Vec<String> = gate.inputs.iter().map(|s| expr(netlist, *s)).collect();
    let o: Vec<String> = gate.outputs.iter().map(|s| expr(netlist, *s)).collect();
    let assign = |lhs: &str, rhs: String| format!("  assign {} = {}; // {}", lhs, rhs, gate.name);
    let lines: Vec<String> = match gate.primitive {
        Primitive::And2 => vec![assign(&o[0], format!("{} & {}", i[0], i[1]))],
        Primitive::Or2 => vec![assign(&o[0], format!("{} | {}", i[0], i[1]))],
        Primitive::Xor2 => vec![assign(&o[0], format!("{} ^ {}", i[0], i[1]))],
        Primitive::Inv => vec![assign(&o[0], format!("~{}", i[0]))],
        Primitive::HalfAdder => vec![
            assign(&o[0], format!("{} ^ {}", i[0], i[1])),
            assign(&o[1], format!("{} & {}", i[0], i[1])),
        ],
        Primitive::FullAdder => vec![
            assign(&o[0], format!("{} ^ {} ^ {}", i[0], i[1], i[2])),
            assign(
                &o[1],
                format!("({} & {}) | ({} & ({} ^ {}))", i[0], i[1], i[2], i[0], i[1]),
            ),
        ],
        Primitive::Ao21 => vec![assign(&o[0], format!("({} & {}) | {}", i[0], i[1], i[2]))],
        Primitive::Ao22 => vec![assign(
            &o[0],
            format!("({} & {}) | ({} & {})", i[0], i[1], i[2], i[3]),
        )],
        Primitive::Ao32 => vec![assign(
            &o[0],
            format!("({} & {} & {}) | ({} & {})", i[0], i[1], i[2], i[3], i[4]),
        )],
        Primitive::Add => {
            let (lhs, rhs) = gate.inputs.split_at(gate.outputs.len());
            vec![assign(
                &concat_msb_first(netlist, &gate.outputs),
                format!(
                    "{} + {}",
                    concat_msb_first(netlist, lhs),
                    concat_msb_first(netlist, rhs)
                ),
            )]
        }
        Primitive::Dff => vec![format!(
            "  always @(posedge {}) {} <= {}; // {}",
            clock, o[0], i[0], gate.name
        )],
    };
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
}

fn emit_cell(
    netlist: &Netlist,
    gate: &GateInstance,
    binding: &CellBinding,
    clock: &str,
    out: &mut String,
) {
    let mut connections: Vec<String> = Vec::new();
    if let Some(pin) = &binding.clock_pin {
        connections.push(format!(".{}({})", pin, clock));
    }
    for (pin, signal) in binding.input_pins.iter().zip(gate.inputs.iter()) {
        connections.push(format!(".{}({})", pin, expr(netlist, *signal)));
    }
    for (pin, signal) in binding.output_pins.iter().zip(gate.outputs.iter()) {
        connections.push(format!(".{}({})", pin, expr(netlist, *signal)));
    }
    if netlist.powered {
        for (pin, rail) in binding.power_pins.iter() {
            connections.push(format!(".{}({})", pin, rail));
        }
    }
    let _ = writeln!(out, "  {} {} (", binding.cell, gate.name);
    let _ = writeln!(out, "    {}", connections.join(",\n    "));
    let _ = writeln!(out, "  );");
}

pub fn emit_netlist(netlist: &Netlist) -> String {
    let mut out = String::new();
    let clock = netlist.clock.clone().unwrap_or_else(|| "clk".to_string());

    let mut ports: Vec<String> = Vec::new();
    if netlist.clock.is_some() {
        ports.push(format!("  input wire {}", clock));
    }
    if netlist.powered {
        ports.push("  input wire VPWR".to_string());
        ports.push("  input wire VGND".to_string());
    }
    for input in netlist.inputs.iter() {
        ports.push(format!(
            "  input wire [{}:0] {}",
            input.get_bit_count() - 1,
            input.name
        ));
    }
    for output in netlist.outputs.iter() {
        ports.push(format!(
            "  output wire [{}:0] {}",
            output.get_bit_count() - 1,
            output.name
        ));
    }
    let _ = writeln!(out, "module {}(", netlist.name);
    let _ = writeln!(out, "{}", ports.join(",\n"));
    let _ = writeln!(out, ");");

    // Inferred registers are assigned procedurally and so need `reg`.
    let mut is_reg = vec![false; netlist.signals.len()];
    for gate in netlist.gates.iter() {
        if gate.primitive == Primitive::Dff && gate.realization == Realization::Inferred {
            for output in gate.outputs.iter() {
                is_reg[output.id] = true;
            }
        }
    }
    for (id, node) in netlist.signals.iter().enumerate() {
        if let SignalNode::Wire { .. } = node {
            let kind = if is_reg[id] { "reg" } else { "wire" };
            let _ = writeln!(out, "  {} {};", kind, netlist.signal_name(SignalRef { id }));
        }
    }

    for gate in netlist.gates.iter() {
        match &gate.realization {
            Realization::Inferred => emit_inferred(netlist, gate, &clock, &mut out),
            Realization::Cell(binding) => emit_cell(netlist, gate, binding, &clock, &mut out),
        }
    }

    for output in netlist.outputs.iter() {
        for (i, bit) in output.bit_vector.iter_lsb_to_msb().enumerate() {
            let _ = writeln!(out, "  assign {}[{}] = {};", output.name, i, expr(netlist, *bit));
        }
    }
    out.push_str("endmodule\n");
    out
}
