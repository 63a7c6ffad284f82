/*
vector.rs

Copyright 2025 Hervé Quatremain

This file is part of Mazewalk.

Mazewalk is free software: you can redistribute it and/or modify it under the
terms of the GNU General Public License as published by the Free Software
Foundation, either version 3 of the License, or (at your option) any later
version.

Mazewalk is distributed in the hope that it will be useful, but WITHOUT ANY
WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR
A PARTICULAR PURPOSE. See the GNU General Public License for more details.

You should have received a copy of the GNU General Public License along with
Mazewalk. If not, see <https://www.gnu.org/licenses/>.

SPDX-License-Identifier: GPL-3.0-or-later
*/

//! Walked connection between two branch cells.
//!
//! The [`VectorHash`] of a vector only depends on its two endpoints, not on the walking
//! direction or on the cells in between. Two vectors joining the same branch cells therefore
//! collapse into one entry.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::grid::CellId;

/// Undirected endpoint pair, smallest cell first.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VectorHash(CellId, CellId);

impl VectorHash {
    /// Create the hash for the given endpoints, in any order.
    pub fn new(a: CellId, b: CellId) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }
}

impl fmt::Display for VectorHash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.0, self.1)
    }
}

/// Vector object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Vector {
    /// First cell.
    pub start: CellId,

    /// Last cell.
    pub end: CellId,

    /// Walked cells from [`Vector::start`] to [`Vector::end`], both included.
    pub steps: Vec<CellId>,

    /// Endpoint pair.
    pub hash: VectorHash,
}

impl Vector {
    /// Create a [`Vector`] object from the walked cells.
    ///
    /// Return [`None`] when `steps` is empty.
    pub fn new(steps: Vec<CellId>) -> Option<Self> {
        let start: CellId = *steps.first()?;
        let end: CellId = *steps.last()?;
        Some(Self {
            start,
            end,
            steps,
            hash: VectorHash::new(start, end),
        })
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Return the vector walked the other way.
    pub fn reversed(&self) -> Self {
        Self {
            start: self.end,
            end: self.start,
            steps: self.steps.iter().rev().copied().collect(),
            hash: self.hash,
        }
    }

    /// Whether the cell is one of the two endpoints.
    pub fn has_endpoint(&self, cell: CellId) -> bool {
        self.start == cell || self.end == cell
    }

    /// Whether the two vectors have cells in common besides their shared endpoints.
    pub fn overlaps(&self, other: &Vector) -> bool {
        let mine: HashSet<CellId> = self.steps.iter().copied().collect();
        other
            .steps
            .iter()
            .any(|c| mine.contains(c) && !(self.has_endpoint(*c) && other.has_endpoint(*c)))
    }

    /// Concatenate two vectors that share an endpoint.
    ///
    /// The shared endpoint becomes an interior cell of the returned vector.
    /// Return [`None`] if the vectors do not share an endpoint, if the result would be a loop,
    /// or if a cell would be visited twice.
    pub fn merge(&self, other: &Vector) -> Option<Vector> {
        let (first, second): (Vector, Vector) = if self.end == other.start {
            (self.clone(), other.clone())
        } else if self.end == other.end {
            (self.clone(), other.reversed())
        } else if self.start == other.end {
            (other.clone(), self.clone())
        } else if self.start == other.start {
            (self.reversed(), other.clone())
        } else {
            return None;
        };

        if first.start == second.end {
            return None;
        }

        let mut seen: HashSet<CellId> = HashSet::with_capacity(first.len() + second.len());
        let mut steps: Vec<CellId> = Vec::with_capacity(first.len() + second.len());
        for cell in first.steps.iter().chain(second.steps.iter().skip(1)) {
            if !seen.insert(*cell) {
                return None;
            }
            steps.push(*cell);
        }
        Vector::new(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(steps: &[CellId]) -> Vector {
        Vector::new(steps.to_vec()).expect("non-empty steps")
    }

    #[test]
    fn hash_ignores_direction() {
        let v: Vector = vector(&[3, 4, 5]);

        assert_eq!(v.hash, VectorHash::new(5, 3));
        assert_eq!(v.reversed().hash, v.hash);
        assert_eq!(v.reversed().steps, vec![5, 4, 3]);
        assert_eq!(v.hash.to_string(), "3-5");
    }

    #[test]
    fn merge_orients_on_the_shared_endpoint() {
        let a: Vector = vector(&[1, 2, 3]);
        let b: Vector = vector(&[7, 6, 3]);

        let merged: Vector = a.merge(&b).expect("shared endpoint 3");
        assert_eq!(merged.steps, vec![1, 2, 3, 6, 7]);
        assert_eq!(merged.hash, VectorHash::new(1, 7));

        let merged: Vector = b.merge(&a).expect("shared endpoint 3");
        assert_eq!(merged.steps, vec![7, 6, 3, 2, 1]);
    }

    #[test]
    fn merge_rejects_loops_and_revisits() {
        let a: Vector = vector(&[1, 2, 3]);

        assert!(a.merge(&vector(&[3, 4, 1])).is_none());
        assert!(a.merge(&vector(&[3, 2, 9])).is_none());
        assert!(a.merge(&vector(&[8, 9])).is_none());
    }

    #[test]
    fn overlap_ignores_shared_endpoints() {
        let a: Vector = vector(&[1, 2, 3]);

        assert!(!a.overlaps(&vector(&[3, 4, 5])));
        assert!(a.overlaps(&vector(&[3, 2, 5])));
        assert!(a.has_endpoint(3));
        assert!(!a.has_endpoint(2));
    }
}
