// SPDX-License-Identifier: Apache-2.0

//! Pluggable realization of abstract primitives.
//!
//! A `GateProvider` answers one question: can this primitive be realized
//! directly, and if so how? Primitives a provider declines are decomposed by
//! the `NetlistBuilder` into simpler ones, bottoming out at the mandatory
//! basis (AND2, INV, DFF).

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::arith_error::ConfigError;
use crate::netlist::{Primitive, Realization};
use crate::sky130_cells::CellLibrary;

/// Primitives every provider must realize.
pub const BASIS_PRIMITIVES: [Primitive; 3] = [Primitive::And2, Primitive::Inv, Primitive::Dff];

pub trait GateProvider {
    fn name(&self) -> &str;

    /// Returns `None` when the provider has no native realization, in which
    /// case the builder decomposes the request.
    fn realize(&self, primitive: Primitive) -> Option<Realization>;
}

/// Realizes primitives as boolean expressions, leaving mapping to downstream
/// synthesis.
#[derive(Debug, Clone, Default)]
pub struct InferredProvider {
    /// `None` means every primitive is supported.
    supported: Option<HashSet<Primitive>>,
}

impl InferredProvider {
    pub fn new() -> Self {
        Self { supported: None }
    }

    /// Restricts the provider to `primitives`; everything else decomposes.
    pub fn with_only(primitives: &[Primitive]) -> Self {
        Self {
            supported: Some(primitives.iter().cloned().collect()),
        }
    }
}

impl GateProvider for InferredProvider {
    fn name(&self) -> &str {
        "inferred"
    }

    fn realize(&self, primitive: Primitive) -> Option<Realization> {
        match &self.supported {
            Some(set) if !set.contains(&primitive) => None,
            _ => Some(Realization::Inferred),
        }
    }
}

pub fn check_provider_basis(provider: &dyn GateProvider) -> Result<(), ConfigError> {
    for primitive in BASIS_PRIMITIVES {
        if provider.realize(primitive).is_none() {
            return Err(ConfigError::MissingBasisPrimitive {
                provider: provider.name().to_string(),
                primitive,
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Process {
    /// No technology; every primitive is inferred.
    #[default]
    Generic,
    Sky130,
}

impl Process {
    pub fn provider(&self) -> Box<dyn GateProvider> {
        match self {
            Process::Generic => Box::new(InferredProvider::new()),
            Process::Sky130 => Box::new(CellLibrary::sky130_hd()),
        }
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Process::Generic => write!(f, "none"),
            Process::Sky130 => write!(f, "sky130"),
        }
    }
}

impl FromStr for Process {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" | "generic" => Ok(Process::Generic),
            "sky130" => Ok(Process::Sky130),
            _ => Err(ConfigError::UnknownProcess(s.to_string())),
        }
    }
}
