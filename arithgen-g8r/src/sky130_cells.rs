// SPDX-License-Identifier: Apache-2.0

//! Cell library descriptions used by structural gate providers.

use std::collections::HashMap;

use crate::gate_provider::GateProvider;
use crate::netlist::{CellBinding, Primitive, Realization};

#[derive(Debug, Clone)]
pub struct CellDef {
    pub name: String,
    pub input_pins: Vec<&'static str>,
    pub output_pins: Vec<&'static str>,
    pub clock_pin: Option<&'static str>,
}

/// A named set of cells, keyed by the primitive each one implements.
#[derive(Debug, Clone)]
pub struct CellLibrary {
    pub name: String,
    cells: HashMap<Primitive, CellDef>,
    /// `(pin, rail)` pairs attached to every cell.
    power_pins: Vec<(&'static str, &'static str)>,
}

impl CellLibrary {
    /// SkyWater 130nm high-density standard cells, drive strength 1.
    ///
    /// There is no word-level adder macro, so `Add` always decomposes.
    pub fn sky130_hd() -> Self {
        let prefix = "sky130_fd_sc_hd";
        let mut cells = HashMap::new();
        let mut add = |primitive: Primitive,
                       base: &str,
                       input_pins: &[&'static str],
                       output_pins: &[&'static str],
                       clock_pin: Option<&'static str>| {
            cells.insert(
                primitive,
                CellDef {
                    name: format!("{}__{}", prefix, base),
                    input_pins: input_pins.to_vec(),
                    output_pins: output_pins.to_vec(),
                    clock_pin,
                },
            );
        };
        add(Primitive::And2, "and2_1", &["A", "B"], &["X"], None);
        add(Primitive::Or2, "or2_1", &["A", "B"], &["X"], None);
        add(Primitive::Xor2, "xor2_1", &["A", "B"], &["X"], None);
        add(Primitive::Inv, "inv_1", &["A"], &["Y"], None);
        add(Primitive::HalfAdder, "ha_1", &["A", "B"], &["SUM", "COUT"], None);
        add(
            Primitive::FullAdder,
            "fa_1",
            &["A", "B", "CIN"],
            &["SUM", "COUT"],
            None,
        );
        add(Primitive::Ao21, "a21o_1", &["A1", "A2", "B1"], &["X"], None);
        add(
            Primitive::Ao22,
            "a22o_1",
            &["A1", "A2", "B1", "B2"],
            &["X"],
            None,
        );
        add(
            Primitive::Ao32,
            "a32o_1",
            &["A1", "A2", "A3", "B1", "B2"],
            &["X"],
            None,
        );
        add(Primitive::Dff, "dfxtp_1", &["D"], &["Q"], Some("CLK"));
        CellLibrary {
            name: prefix.to_string(),
            cells,
            power_pins: vec![
                ("VPWR", "VPWR"),
                ("VGND", "VGND"),
                ("VPB", "VPWR"),
                ("VNB", "VGND"),
            ],
        }
    }

    pub fn get_cell(&self, primitive: Primitive) -> Option<&CellDef> {
        self.cells.get(&primitive)
    }
}

impl GateProvider for CellLibrary {
    fn name(&self) -> &str {
        &self.name
    }

    fn realize(&self, primitive: Primitive) -> Option<Realization> {
        let cell = self.cells.get(&primitive)?;
        Some(Realization::Cell(CellBinding {
            cell: cell.name.clone(),
            input_pins: cell.input_pins.iter().map(|p| p.to_string()).collect(),
            output_pins: cell.output_pins.iter().map(|p| p.to_string()).collect(),
            clock_pin: cell.clock_pin.map(|p| p.to_string()),
            power_pins: self
                .power_pins
                .iter()
                .map(|(pin, rail)| (pin.to_string(), rail.to_string()))
                .collect(),
        }))
    }
}
