// SPDX-License-Identifier: Apache-2.0

//! Partial-product generation for unsigned multiplication.
//!
//! Booth radix-4 recodes the multiplier `a` into `N/2 + 1` signed digits in
//! `{-2, -1, 0, +1, +2}`. Each digit selects a row `d_k * b` of the
//! multiplicand, shifted by `2k`. Negative rows are produced as a ones'
//! complement plus a `+1` placed in the row's lowest column, and the implied
//! sign extension is folded into a few constant and `sign`/`!sign` bits per
//! row:
//!
//! ```text
//! row 0        : s, s, !s   at columns N+1, N+2, N+3
//! rows 1..N/2-1: !s, 1      at columns 2k+N+1, 2k+N+2
//! row N/2      : (sign is always zero; nothing extra)
//! ```
//!
//! Row 0 contributes `2^(N+3) - s*2^(N+1)` and each middle row
//! `3*2^(2k+N+1) - s*2^(2k+N+1)`. The constant parts sum to `2^(2N+1)`, which
//! vanishes modulo `2^(2N)`.

use std::fmt;
use std::str::FromStr;

use crate::arith_error::ConfigError;
use crate::netlist::{BitVector, SignalRef};
use crate::netlist_builder::NetlistBuilder;
use crate::pp_matrix::PartialProductMatrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartialProductScheme {
    #[default]
    BoothRadix4,
    /// One AND2 per bit pair.
    Schoolbook,
}

impl PartialProductScheme {
    /// Booth rows may spill one column past `2N`; that column is discarded
    /// before reduction.
    pub fn column_count(&self, bit_count: usize) -> usize {
        match self {
            PartialProductScheme::BoothRadix4 => 2 * bit_count + 1,
            PartialProductScheme::Schoolbook => 2 * bit_count,
        }
    }

    pub fn validate_width(&self, bit_count: usize) -> Result<(), ConfigError> {
        if bit_count == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if *self == PartialProductScheme::BoothRadix4 && bit_count % 2 != 0 {
            return Err(ConfigError::OddBoothWidth(bit_count));
        }
        Ok(())
    }
}

impl fmt::Display for PartialProductScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartialProductScheme::BoothRadix4 => write!(f, "booth"),
            PartialProductScheme::Schoolbook => write!(f, "schoolbook"),
        }
    }
}

impl FromStr for PartialProductScheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "booth" => Ok(PartialProductScheme::BoothRadix4),
            "schoolbook" => Ok(PartialProductScheme::Schoolbook),
            _ => Err(ConfigError::UnknownPartialProductScheme(s.to_string())),
        }
    }
}

/// Control signals decoded from one 3-bit multiplier window.
///
/// | window | digit | sign | times_two | times_one |
/// |---|---|---|---|---|
/// | 000 | +0 | 0 | 0 | 0 |
/// | 001, 010 | +1 | 0 | 0 | 1 |
/// | 011 | +2 | 0 | 1 | 0 |
/// | 100 | -2 | 1 | 1 | 0 |
/// | 101, 110 | -1 | 1 | 0 | 1 |
/// | 111 | -0 | 1 | 0 | 0 |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoothEncoding {
    pub sign: SignalRef,
    pub times_one: SignalRef,
    pub times_two: SignalRef,
}

/// `block` is lsb-first.
pub fn gatify_booth_encoder(
    block: [SignalRef; 3],
    builder: &mut NetlistBuilder,
) -> BoothEncoding {
    let [b0, b1, b2] = block;
    let nb0 = builder.add_inv(b0);
    let nb1 = builder.add_inv(b1);
    let nb2 = builder.add_inv(b2);
    // 011 | 100
    let t = builder.add_and2(b2, nb1);
    let times_two = builder.add_ao32(nb2, b1, b0, t, nb0);
    // ?01 | ?10
    let times_one = builder.add_ao22(nb1, b0, b1, nb0);
    BoothEncoding {
        sign: b2,
        times_one,
        times_two,
    }
}

/// One partial-product bit: `((m_lo & times_two) | (m_hi & times_one)) ^ sign`
/// where `m_lo`/`m_hi` are padded multiplicand bits `m` and `m + 1`.
pub fn gatify_booth_mux(
    m_lo: SignalRef,
    m_hi: SignalRef,
    encoding: &BoothEncoding,
    builder: &mut NetlistBuilder,
) -> SignalRef {
    let t = builder.add_ao22(m_lo, encoding.times_two, m_hi, encoding.times_one);
    builder.add_xor2(t, encoding.sign)
}

/// Fills a `2N + 1` column matrix with the Booth rows of `multiplier *
/// multiplicand`.
pub fn gatify_booth_partial_products(
    multiplier: &BitVector,
    multiplicand: &BitVector,
    builder: &mut NetlistBuilder,
) -> PartialProductMatrix {
    let bits = multiplier.get_bit_count();
    assert_eq!(bits, multiplicand.get_bit_count());
    assert!(bits % 2 == 0, "booth radix-4 requires an even width");
    let zero = builder.get_false();
    let one = builder.get_true();

    // Multiplier: one low zero and two high zeros so the top window sees an
    // unsigned value. Multiplicand: one low zero, implicit high zero.
    let mut mplier = vec![zero];
    mplier.extend(multiplier.iter_lsb_to_msb().cloned());
    mplier.extend([zero, zero]);
    let mut mcand = vec![zero];
    mcand.extend(multiplicand.iter_lsb_to_msb().cloned());
    mcand.push(zero);

    let column_count = PartialProductScheme::BoothRadix4.column_count(bits);
    let mut matrix = PartialProductMatrix::new(column_count);
    let last_row = bits / 2;
    for row in 0..=last_row {
        let off_b = 2 * row;
        builder.set_scope(Some(&format!("booth_r{}", row)));
        let block = [mplier[off_b], mplier[off_b + 1], mplier[off_b + 2]];
        let encoding = gatify_booth_encoder(block, builder);
        for off_m in 0..=bits {
            let bit = gatify_booth_mux(mcand[off_m], mcand[off_m + 1], &encoding, builder);
            matrix.push(off_b + off_m, bit);
        }
        if row == last_row {
            continue;
        }
        let sign = encoding.sign;
        let not_sign = builder.add_inv(sign);
        if row == 0 {
            matrix.push(bits + 1, sign);
            matrix.push(bits + 2, sign);
            matrix.push(bits + 3, not_sign);
        } else {
            matrix.push(off_b + bits + 1, not_sign);
            matrix.push(off_b + bits + 2, one);
        }
        // Completes the two's complement of a negated row.
        matrix.push(off_b, sign);
    }
    builder.set_scope(None);
    log::debug!(
        "booth radix-4 {}x{}: {} rows, column heights {:?}",
        bits,
        bits,
        last_row + 1,
        matrix.heights()
    );
    matrix
}

pub fn gatify_schoolbook_partial_products(
    lhs: &BitVector,
    rhs: &BitVector,
    builder: &mut NetlistBuilder,
) -> PartialProductMatrix {
    let bits = lhs.get_bit_count();
    assert_eq!(bits, rhs.get_bit_count());
    let column_count = PartialProductScheme::Schoolbook.column_count(bits);
    let mut matrix = PartialProductMatrix::new(column_count);
    builder.set_scope(Some("pp"));
    for (i, a) in lhs.iter_lsb_to_msb().enumerate() {
        for (j, b) in rhs.iter_lsb_to_msb().enumerate() {
            let bit = builder.add_and2(*a, *b);
            matrix.push(i + j, bit);
        }
    }
    builder.set_scope(None);
    matrix
}

pub fn gatify_partial_products(
    scheme: PartialProductScheme,
    lhs: &BitVector,
    rhs: &BitVector,
    builder: &mut NetlistBuilder,
) -> Result<PartialProductMatrix, ConfigError> {
    scheme.validate_width(lhs.get_bit_count())?;
    Ok(match scheme {
        PartialProductScheme::BoothRadix4 => gatify_booth_partial_products(lhs, rhs, builder),
        PartialProductScheme::Schoolbook => gatify_schoolbook_partial_products(lhs, rhs, builder),
    })
}
