// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for netlist generation.
//!
//! * `ConfigError` -- the requested parameter set cannot be built; raised
//!   before any IR exists.
//! * `NetlistError` -- the finished IR failed its structural checks (driver
//!   completeness, widths, loops). These indicate generator defects.

use std::fmt;

use crate::netlist::{Primitive, SignalRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroWidth,
    /// Tree topologies compute their level count as an integer log2.
    WidthNotPowerOfTwo {
        algorithm: String,
        bit_count: usize,
    },
    /// Booth radix-4 consumes the multiplier two bits at a time.
    OddBoothWidth(usize),
    UnknownAlgorithm(String),
    UnknownProcess(String),
    UnknownPartialProductScheme(String),
    /// The provider cannot realize one of the primitives every other primitive
    /// decomposes into.
    MissingBasisPrimitive {
        provider: String,
        primitive: Primitive,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroWidth => write!(f, "bit width must be at least 1"),
            ConfigError::WidthNotPowerOfTwo {
                algorithm,
                bit_count,
            } => write!(
                f,
                "{} requires a power-of-two width; got {} bits",
                algorithm, bit_count
            ),
            ConfigError::OddBoothWidth(bit_count) => write!(
                f,
                "booth radix-4 requires an even width; got {} bits",
                bit_count
            ),
            ConfigError::UnknownAlgorithm(name) => write!(
                f,
                "unknown adder algorithm {:?}; expected one of brentkung, koggestone, hancarlson, inferred",
                name
            ),
            ConfigError::UnknownProcess(name) => write!(
                f,
                "unknown process {:?}; expected one of none, sky130",
                name
            ),
            ConfigError::UnknownPartialProductScheme(name) => write!(
                f,
                "unknown partial product scheme {:?}; expected one of booth, schoolbook",
                name
            ),
            ConfigError::MissingBasisPrimitive {
                provider,
                primitive,
            } => write!(
                f,
                "gate provider {} cannot realize basis primitive {}",
                provider, primitive
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetlistError {
    SignalOutOfBounds {
        signal: SignalRef,
        signal_count: usize,
    },
    UndrivenSignal {
        signal: SignalRef,
        reader: String,
    },
    MultiplyDrivenSignal {
        signal: SignalRef,
        first: String,
        second: String,
    },
    /// A gate tried to drive a primary input or a literal.
    DrivenSource {
        signal: SignalRef,
        gate: String,
    },
    PortWidthMismatch {
        port: String,
        expected: usize,
        got: usize,
    },
    Arity {
        gate: String,
        primitive: Primitive,
        inputs: usize,
        outputs: usize,
    },
    CombinationalLoop {
        stuck_gates: usize,
    },
    UnknownPort(String),
}

impl fmt::Display for NetlistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetlistError::SignalOutOfBounds {
                signal,
                signal_count,
            } => write!(
                f,
                "signal %{} is out of bounds (signal count {})",
                signal.id, signal_count
            ),
            NetlistError::UndrivenSignal { signal, reader } => {
                write!(f, "signal %{} read by {} has no driver", signal.id, reader)
            }
            NetlistError::MultiplyDrivenSignal {
                signal,
                first,
                second,
            } => write!(
                f,
                "signal %{} is driven by both {} and {}",
                signal.id, first, second
            ),
            NetlistError::DrivenSource { signal, gate } => write!(
                f,
                "gate {} drives %{} which is an input or literal",
                gate, signal.id
            ),
            NetlistError::PortWidthMismatch {
                port,
                expected,
                got,
            } => write!(
                f,
                "port {} expected {} bits but has {}",
                port, expected, got
            ),
            NetlistError::Arity {
                gate,
                primitive,
                inputs,
                outputs,
            } => write!(
                f,
                "gate {} ({}) has {} inputs and {} outputs",
                gate, primitive, inputs, outputs
            ),
            NetlistError::CombinationalLoop { stuck_gates } => write!(
                f,
                "combinational loop; {} gates could not be ordered",
                stuck_gates
            ),
            NetlistError::UnknownPort(name) => write!(f, "no port named {:?}", name),
        }
    }
}

impl std::error::Error for NetlistError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArithError {
    Config(ConfigError),
    Netlist(NetlistError),
}

impl fmt::Display for ArithError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithError::Config(e) => write!(f, "configuration error: {}", e),
            ArithError::Netlist(e) => write!(f, "netlist error: {}", e),
        }
    }
}

impl std::error::Error for ArithError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArithError::Config(e) => Some(e),
            ArithError::Netlist(e) => Some(e),
        }
    }
}

impl From<ConfigError> for ArithError {
    fn from(e: ConfigError) -> Self {
        ArithError::Config(e)
    }
}

impl From<NetlistError> for ArithError {
    fn from(e: NetlistError) -> Self {
        ArithError::Netlist(e)
    }
}
