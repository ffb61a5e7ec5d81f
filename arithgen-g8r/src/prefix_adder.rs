// SPDX-License-Identifier: Apache-2.0

//! Parallel-prefix adders.
//!
//! All tree topologies share the same skeleton: a half adder per bit produces
//! `(p, g)`, the tree combines pairs in place, and the sum is
//! `p_orig[i] ^ g[i - 1]`. The topologies differ only in which `(bit_to,
//! bit_from)` pairs are combined and in what order. Updates within one level
//! must read the previous level's values, so every level walks from the most
//! significant pair downward.

use std::fmt;
use std::str::FromStr;

use crate::arith_error::ConfigError;
use crate::netlist::{BitVector, SignalRef};
use crate::netlist_builder::NetlistBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdderAlgorithm {
    #[default]
    BrentKung,
    KoggeStone,
    HanCarlson,
    /// Defer to the provider's word-level adder.
    Inferred,
}

impl AdderAlgorithm {
    pub const ALL: [AdderAlgorithm; 4] = [
        AdderAlgorithm::BrentKung,
        AdderAlgorithm::KoggeStone,
        AdderAlgorithm::HanCarlson,
        AdderAlgorithm::Inferred,
    ];

    pub fn is_tree(&self) -> bool {
        !matches!(self, AdderAlgorithm::Inferred)
    }

    /// Tree topologies index levels by `log2(bit_count)`.
    pub fn validate_width(&self, bit_count: usize) -> Result<(), ConfigError> {
        if bit_count == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if self.is_tree() && !bit_count.is_power_of_two() {
            return Err(ConfigError::WidthNotPowerOfTwo {
                algorithm: self.to_string(),
                bit_count,
            });
        }
        Ok(())
    }
}

impl fmt::Display for AdderAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdderAlgorithm::BrentKung => write!(f, "brentkung"),
            AdderAlgorithm::KoggeStone => write!(f, "koggestone"),
            AdderAlgorithm::HanCarlson => write!(f, "hancarlson"),
            AdderAlgorithm::Inferred => write!(f, "inferred"),
        }
    }
}

impl FromStr for AdderAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "brentkung" => Ok(AdderAlgorithm::BrentKung),
            "koggestone" => Ok(AdderAlgorithm::KoggeStone),
            "hancarlson" => Ok(AdderAlgorithm::HanCarlson),
            "inferred" => Ok(AdderAlgorithm::Inferred),
            _ => Err(ConfigError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Per-bit propagate/generate state, updated in place level by level.
struct PrefixTree {
    p: Vec<SignalRef>,
    g: Vec<SignalRef>,
}

impl PrefixTree {
    /// Folds `[bit_from]` into `[bit_to]`:
    /// `p = p_to & p_from`, `g = g_to | (p_to & g_from)`.
    fn combine(&mut self, bit_to: usize, bit_from: usize, builder: &mut NetlistBuilder) {
        debug_assert!(bit_from < bit_to);
        let p_new = builder.add_and2(self.p[bit_to], self.p[bit_from]);
        let g_new = builder.add_ao21(self.p[bit_to], self.g[bit_from], self.g[bit_to]);
        log::trace!("prefix combine {} <- {}", bit_to, bit_from);
        self.p[bit_to] = p_new;
        self.g[bit_to] = g_new;
    }

    fn brent_kung(&mut self, levels: usize, builder: &mut NetlistBuilder) {
        let bits = self.p.len();
        for i in 1..=levels {
            let stride = 1usize << i;
            let half = stride >> 1;
            for j in (stride - 1..bits).step_by(stride).rev() {
                self.combine(j, j - half, builder);
            }
        }
        for i in (1..=levels).rev() {
            let stride = 1usize << i;
            let half = stride >> 1;
            for j in (stride + half - 1..bits).step_by(stride).rev() {
                self.combine(j, j - half, builder);
            }
        }
    }

    /// With `odd_only`, restricts the levels to odd `bit_to` (Han-Carlson).
    fn kogge_stone(&mut self, levels: usize, odd_only: bool, builder: &mut NetlistBuilder) {
        let bits = self.p.len();
        for level in 0..levels {
            let span = 1usize << level;
            for bit_from in (0..bits - span).rev() {
                let bit_to = bit_from + span;
                if odd_only && bit_to % 2 == 0 {
                    continue;
                }
                self.combine(bit_to, bit_from, builder);
            }
        }
    }

    fn han_carlson(&mut self, levels: usize, builder: &mut NetlistBuilder) {
        self.kogge_stone(levels, true, builder);
        // Bit 0 has no predecessor; every other even bit takes its odd
        // neighbor's finished prefix.
        let bits = self.p.len();
        if bits >= 3 {
            for bit_to in (2..=bits - 2).rev().step_by(2) {
                self.combine(bit_to, bit_to - 1, builder);
            }
        }
    }
}

/// Returns `(lhs + rhs) mod 2^n`; the carry-out is not exposed.
pub fn gatify_prefix_add(
    lhs: &BitVector,
    rhs: &BitVector,
    algorithm: AdderAlgorithm,
    tag_prefix: Option<&str>,
    builder: &mut NetlistBuilder,
) -> Result<BitVector, ConfigError> {
    assert_eq!(lhs.get_bit_count(), rhs.get_bit_count());
    let bits = lhs.get_bit_count();
    algorithm.validate_width(bits)?;
    if let Some(prefix) = tag_prefix {
        builder.set_scope(Some(&format!("{}_{}", prefix, algorithm)));
    }

    if algorithm == AdderAlgorithm::Inferred {
        let sum = builder.add_add(lhs, rhs);
        builder.set_scope(None);
        return Ok(sum);
    }

    let mut p = Vec::with_capacity(bits);
    let mut g = Vec::with_capacity(bits);
    for i in 0..bits {
        let ha = builder.add_half_adder(*lhs.get_lsb(i), *rhs.get_lsb(i));
        p.push(ha.sum);
        g.push(ha.carry);
    }
    let p_orig = p.clone();
    let mut tree = PrefixTree { p, g };
    let levels = bits.trailing_zeros() as usize;
    let gates_before = builder.gate_count();
    match algorithm {
        AdderAlgorithm::BrentKung => tree.brent_kung(levels, builder),
        AdderAlgorithm::KoggeStone => tree.kogge_stone(levels, false, builder),
        AdderAlgorithm::HanCarlson => tree.han_carlson(levels, builder),
        AdderAlgorithm::Inferred => unreachable!(),
    }
    log::debug!(
        "{} prefix tree over {} bits: {} levels, {} gates",
        algorithm,
        bits,
        levels,
        builder.gate_count() - gates_before
    );

    // g[-1] is constant zero, so bit 0 is just the propagate.
    let mut sum = Vec::with_capacity(bits);
    sum.push(p_orig[0]);
    for i in 1..bits {
        sum.push(builder.add_xor2(p_orig[i], tree.g[i - 1]));
    }
    builder.set_scope(None);
    Ok(BitVector::from(sum))
}
