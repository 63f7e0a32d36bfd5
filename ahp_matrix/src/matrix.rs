use std::ops::Index;

use nalgebra::DMatrix;

use crate::config::*;

/// A dense pairwise comparison matrix.
///
/// Entry (i, j) states how much criterion i is preferred over criterion j.
/// The diagonal is always 1. Matrices produced by the builder are reciprocal:
/// (i, j) * (j, i) == 1 for every pair.
#[derive(PartialEq, Debug, Clone)]
pub struct ComparisonMatrix {
    size: usize,
    // Row-major
    cells: Vec<f64>,
}

impl ComparisonMatrix {
    /// The matrix of a respondent that did not answer anything: all the entries are 1.
    pub fn neutral(size: usize) -> Result<ComparisonMatrix, AhpErrors> {
        if size == 0 {
            return Err(AhpErrors::EmptyMatrix);
        }
        Ok(ComparisonMatrix {
            size,
            cells: vec![1.0; size * size],
        })
    }

    /// Builds a matrix from dense rows.
    ///
    /// No check is made on the values themselves: this is meant for matrices that were
    /// already validated, for instance when reloading them from storage.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<ComparisonMatrix, AhpErrors> {
        let size = rows.len();
        if size == 0 {
            return Err(AhpErrors::EmptyMatrix);
        }
        let mut cells: Vec<f64> = Vec::with_capacity(size * size);
        for row in rows.iter() {
            if row.len() != size {
                return Err(AhpErrors::NotSquare {
                    rows: size,
                    columns: row.len(),
                });
            }
            cells.extend_from_slice(row);
        }
        Ok(ComparisonMatrix { size, cells })
    }

    /// The number of criteria.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.size && col < self.size {
            Some(self.cells[row * self.size + col])
        } else {
            None
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.cells.chunks(self.size)
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(|r| r.to_vec()).collect()
    }

    /// All the cells as (row, column, value), row by row.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, v)| (idx / size, idx % size, *v))
    }

    /// Recovers the judgment stored for the pair (first, second).
    ///
    /// Returns None if the indices do not form a pair of this matrix, or if the entries are not
    /// on the 1-9 scale. An equal-importance entry is reported with the lower index as winner.
    pub fn judgment(&self, first: usize, second: usize) -> Option<Judgment> {
        if first == second {
            return None;
        }
        let (i, j) = if first < second {
            (first, second)
        } else {
            (second, first)
        };
        let forward = self.get(i, j)?;
        let (winner, value) = if forward >= 1.0 {
            (i, forward)
        } else {
            (j, self.get(j, i)?)
        };
        let intensity = value.round();
        if (value - intensity).abs() > 1e-9
            || intensity < MIN_INTENSITY as f64
            || intensity > MAX_INTENSITY as f64
        {
            return None;
        }
        Some(Judgment::new(i, j, winner, intensity as u32))
    }

    /// The judgments of all the pairs that are not at the neutral value, lower index first.
    pub fn judgments(&self) -> Vec<Judgment> {
        let mut res: Vec<Judgment> = Vec::new();
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if self[(i, j)] == 1.0 {
                    continue;
                }
                if let Some(jd) = self.judgment(i, j) {
                    res.push(jd);
                }
            }
        }
        res
    }

    // Callers are expected to have validated the indices and the intensity.
    pub(crate) fn set_preference(&mut self, winner: usize, loser: usize, intensity: u32) {
        let value = intensity as f64;
        self.cells[winner * self.size + loser] = value;
        self.cells[loser * self.size + winner] = 1.0 / value;
    }

    pub(crate) fn to_dmatrix(&self) -> DMatrix<f64> {
        DMatrix::from_row_slice(self.size, self.size, &self.cells)
    }
}

impl Index<(usize, usize)> for ComparisonMatrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(
            row < self.size && col < self.size,
            "index ({}, {}) out of bounds for a matrix of size {}",
            row,
            col,
            self.size
        );
        &self.cells[row * self.size + col]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_is_all_ones() {
        let m = ComparisonMatrix::neutral(4).unwrap();
        assert_eq!(m.size(), 4);
        assert!(m.cells().all(|(_, _, v)| v == 1.0));
        assert_eq!(m.cells().count(), 16);
        assert!(m.judgments().is_empty());
    }

    #[test]
    fn neutral_needs_one_criterion() {
        assert_eq!(ComparisonMatrix::neutral(0), Err(AhpErrors::EmptyMatrix));
    }

    #[test]
    fn from_rows_rejects_ragged_rows() {
        let rows = vec![vec![1.0, 2.0], vec![0.5]];
        assert_eq!(
            ComparisonMatrix::from_rows(&rows),
            Err(AhpErrors::NotSquare {
                rows: 2,
                columns: 1
            })
        );
        assert_eq!(ComparisonMatrix::from_rows(&[]), Err(AhpErrors::EmptyMatrix));
    }

    #[test]
    fn cells_are_row_major() {
        let rows = vec![vec![1.0, 2.0], vec![0.5, 1.0]];
        let m = ComparisonMatrix::from_rows(&rows).unwrap();
        let cells: Vec<(usize, usize, f64)> = m.cells().collect();
        assert_eq!(
            cells,
            vec![(0, 0, 1.0), (0, 1, 2.0), (1, 0, 0.5), (1, 1, 1.0)]
        );
        assert_eq!(m.to_rows(), rows);
        assert_eq!(m.get(1, 0), Some(0.5));
        assert_eq!(m.get(2, 0), None);
    }

    #[test]
    fn judgment_reads_both_directions() {
        let rows = vec![
            vec![1.0, 3.0, 0.2],
            vec![1.0 / 3.0, 1.0, 1.0],
            vec![5.0, 1.0, 1.0],
        ];
        let m = ComparisonMatrix::from_rows(&rows).unwrap();
        assert_eq!(m.judgment(0, 1), Some(Judgment::new(0, 1, 0, 3)));
        assert_eq!(m.judgment(2, 0), Some(Judgment::new(0, 2, 2, 5)));
        assert_eq!(m.judgment(1, 2), Some(Judgment::new(1, 2, 1, 1)));
        assert_eq!(m.judgment(1, 1), None);
        assert_eq!(m.judgment(0, 3), None);
        assert_eq!(m.judgments().len(), 2);
    }

    #[test]
    fn judgment_ignores_values_off_the_scale() {
        let rows = vec![vec![1.0, 2.5], vec![0.4, 1.0]];
        let m = ComparisonMatrix::from_rows(&rows).unwrap();
        assert_eq!(m.judgment(0, 1), None);
        let rows = vec![vec![1.0, 12.0], vec![1.0 / 12.0, 1.0]];
        let m = ComparisonMatrix::from_rows(&rows).unwrap();
        assert_eq!(m.judgment(0, 1), None);
    }

    #[test]
    #[should_panic]
    fn index_out_of_bounds_panics() {
        let m = ComparisonMatrix::neutral(2).unwrap();
        let _ = m[(2, 0)];
    }
}
