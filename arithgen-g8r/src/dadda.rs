// SPDX-License-Identifier: Apache-2.0

//! Dadda compressor-tree reduction of a partial-product matrix to two rows.

use crate::netlist::BitVector;
use crate::netlist_builder::NetlistBuilder;
use crate::pp_matrix::PartialProductMatrix;

/// Target heights for successive reduction stages, largest first.
///
/// Generated by `d(0) = 2, d(k+1) = floor(1.5 * d(k))` while `d < max_height`
/// and then reversed, so the last stage always targets 2 (unless the matrix is
/// already at most two high, in which case there are no stages).
pub fn dadda_heights(max_height: usize) -> Vec<usize> {
    let mut heights = Vec::new();
    let mut d = 2usize;
    while d < max_height {
        heights.push(d);
        d = d * 3 / 2;
    }
    heights.reverse();
    heights
}

/// Reduces `matrix` in place and returns its two output rows, each one bit
/// per column.
///
/// For each stage, columns are visited from least to most significant. While a
/// column is above the target, its oldest three bits go through a full adder
/// (if it is at least two over) or its oldest two through a half adder. The
/// sum rejoins the back of the same column and the carry the back of the
/// next one; carries out of the top column are dropped.
pub fn gatify_dadda_reduce(
    matrix: &mut PartialProductMatrix,
    builder: &mut NetlistBuilder,
) -> (BitVector, BitVector) {
    let column_count = matrix.column_count();
    let heights = dadda_heights(matrix.max_height());
    log::debug!(
        "dadda: max height {}, schedule {:?}",
        matrix.max_height(),
        heights
    );

    let mut full_adders = 0;
    let mut half_adders = 0;
    for (stage, target) in heights.iter().enumerate() {
        builder.set_scope(Some(&format!("dadda_s{}", stage)));
        for column in 0..column_count {
            while matrix.height(column) > *target {
                let (sum, carry) = if matrix.height(column) > target + 1 {
                    let a = matrix.pop_front(column);
                    let b = matrix.pop_front(column);
                    let c = matrix.pop_front(column);
                    let (Some(a), Some(b), Some(c)) = (a, b, c) else {
                        unreachable!("column {} shorter than its height", column);
                    };
                    full_adders += 1;
                    let fa = builder.add_full_adder(a, b, c);
                    (fa.sum, fa.carry)
                } else {
                    let a = matrix.pop_front(column);
                    let b = matrix.pop_front(column);
                    let (Some(a), Some(b)) = (a, b) else {
                        unreachable!("column {} shorter than its height", column);
                    };
                    half_adders += 1;
                    let ha = builder.add_half_adder(a, b);
                    (ha.sum, ha.carry)
                };
                matrix.push(column, sum);
                matrix.push(column + 1, carry);
            }
        }
        log::trace!("dadda stage {} -> heights {:?}", stage, matrix.heights());
    }
    builder.set_scope(None);
    debug_assert!(matrix.max_height() <= 2);
    log::debug!(
        "dadda: {} full adders, {} half adders",
        full_adders,
        half_adders
    );

    let zero = builder.get_false();
    let mut row0 = Vec::with_capacity(column_count);
    let mut row1 = Vec::with_capacity(column_count);
    for column in 0..column_count {
        let mut bits = matrix.column(column).cloned();
        row0.push(bits.next().unwrap_or(zero));
        row1.push(bits.next().unwrap_or(zero));
    }
    (BitVector::from(row0), BitVector::from(row1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate_provider::InferredProvider;
    use crate::netlist::Primitive;
    use crate::netlist_sim::Simulator;
    use test_case::test_case;

    #[test]
    fn test_dadda_heights_sequence() {
        assert_eq!(dadda_heights(0), Vec::<usize>::new());
        assert_eq!(dadda_heights(2), Vec::<usize>::new());
        assert_eq!(dadda_heights(3), vec![2]);
        assert_eq!(dadda_heights(9), vec![6, 4, 3, 2]);
        assert_eq!(dadda_heights(33), vec![28, 19, 13, 9, 6, 4, 3, 2]);
    }

    #[test_case(3)]
    #[test_case(10)]
    #[test_case(64)]
    #[test_case(100)]
    fn test_dadda_heights_recurrence(max_height: usize) {
        let mut heights = dadda_heights(max_height);
        heights.reverse();
        assert_eq!(heights[0], 2);
        for pair in heights.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[1], pair[0] * 3 / 2);
        }
        assert!(*heights.last().unwrap() < max_height);
        assert!(heights.last().unwrap() * 3 / 2 >= max_height);
    }

    /// Reduces `k` one-bit inputs all in column 0 of a `width` column matrix
    /// and checks the two rows sum to the population count.
    #[test_case(3, 2)]
    #[test_case(5, 3)]
    #[test_case(9, 4)]
    fn test_reduce_single_column_counts_ones(k: usize, width: usize) {
        let provider = InferredProvider::new();
        let mut builder = NetlistBuilder::new("popcount", &provider).unwrap();
        let x = builder.add_input("x", k);
        let mut matrix = PartialProductMatrix::new(width);
        for bit in x.iter_lsb_to_msb() {
            matrix.push(0, *bit);
        }
        let (r0, r1) = gatify_dadda_reduce(&mut matrix, &mut builder);
        assert!(matrix.heights().iter().all(|h| *h <= 2));
        builder.add_output("r0", r0);
        builder.add_output("r1", r1);
        let netlist = builder.build().unwrap();
        assert!(netlist
            .gates
            .iter()
            .all(|g| matches!(g.primitive, Primitive::FullAdder | Primitive::HalfAdder)));

        let mut sim = Simulator::new(&netlist).unwrap();
        let samples: Vec<u128> = (0..(1u128 << k)).take(64).collect();
        sim.set_input_u128("x", &samples).unwrap();
        sim.settle();
        let r0 = sim.get_output_u128("r0", samples.len()).unwrap();
        let r1 = sim.get_output_u128("r1", samples.len()).unwrap();
        let mask = (1u128 << width) - 1;
        for (i, sample) in samples.iter().enumerate() {
            assert_eq!(
                (r0[i] + r1[i]) & mask,
                (sample.count_ones() as u128) & mask,
                "sample {:#b}",
                sample
            );
        }
    }
}
