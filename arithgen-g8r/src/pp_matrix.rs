// SPDX-License-Identifier: Apache-2.0

use std::collections::VecDeque;

use crate::netlist::SignalRef;

/// Column-indexed bag of partial-product bits. Column `i` holds signals of
/// weight `2^i` in arrival order; reduction consumes them oldest first.
#[derive(Debug, Clone)]
pub struct PartialProductMatrix {
    columns: Vec<VecDeque<SignalRef>>,
}

impl PartialProductMatrix {
    pub fn new(column_count: usize) -> Self {
        Self {
            columns: vec![VecDeque::new(); column_count],
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Bits landing beyond the last column are dropped; the matrix is
    /// arithmetic modulo `2^column_count`.
    pub fn push(&mut self, column: usize, signal: SignalRef) {
        match self.columns.get_mut(column) {
            Some(queue) => queue.push_back(signal),
            None => log::trace!("dropping bit for column {} (out of range)", column),
        }
    }

    pub fn pop_front(&mut self, column: usize) -> Option<SignalRef> {
        self.columns[column].pop_front()
    }

    pub fn height(&self, column: usize) -> usize {
        self.columns[column].len()
    }

    pub fn heights(&self) -> Vec<usize> {
        self.columns.iter().map(|c| c.len()).collect()
    }

    pub fn max_height(&self) -> usize {
        self.columns.iter().map(|c| c.len()).max().unwrap_or(0)
    }

    pub fn column(&self, column: usize) -> impl Iterator<Item = &SignalRef> {
        self.columns[column].iter()
    }

    /// Replaces every entry in place; used to register the matrix between
    /// pipeline stages.
    pub fn map_in_place<F>(&mut self, mut f: F)
    where
        F: FnMut(SignalRef) -> SignalRef,
    {
        for column in self.columns.iter_mut() {
            for signal in column.iter_mut() {
                *signal = f(*signal);
            }
        }
    }

    /// Drops the most significant columns beyond `column_count`.
    pub fn truncate(&mut self, column_count: usize) {
        self.columns.truncate(column_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order_and_out_of_range_drop() {
        let mut m = PartialProductMatrix::new(2);
        m.push(0, SignalRef { id: 5 });
        m.push(0, SignalRef { id: 6 });
        m.push(1, SignalRef { id: 7 });
        m.push(2, SignalRef { id: 8 });
        assert_eq!(m.heights(), vec![2, 1]);
        assert_eq!(m.max_height(), 2);
        assert_eq!(m.pop_front(0), Some(SignalRef { id: 5 }));
        assert_eq!(m.pop_front(0), Some(SignalRef { id: 6 }));
        assert_eq!(m.pop_front(0), None);
        m.truncate(1);
        assert_eq!(m.column_count(), 1);
    }
}
