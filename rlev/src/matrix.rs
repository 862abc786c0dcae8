//! Row-major sparse matrix.
//!
//! [`SparseMatrix`] wraps a CSR [`sprs::CsMat`] so that it can be stored with bincode next to
//! the other artifacts.

use bincode::{Decode, Encode};
use sprs::{CompressedStorage, CsMat, CsVec};

use crate::errors::{Result, RlevError};

/// Sparse matrix in compressed sparse row (CSR) form.
///
/// Column indices within a row are strictly increasing.
#[derive(Clone, Debug)]
pub struct SparseMatrix {
    inner: CsMat<f64>,
}

// Raw CSR arrays as stored in artifacts.
#[derive(Debug, PartialEq, Decode, Encode)]
pub(crate) struct MatrixData {
    n_rows: usize,
    n_cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f64>,
}

impl SparseMatrix {
    /// Creates an empty matrix with `n_cols` columns and no rows.
    pub fn new(n_cols: usize) -> Self {
        Self {
            inner: CsMat::empty(CompressedStorage::CSR, n_cols),
        }
    }

    /// Gets the number of rows.
    pub fn n_rows(&self) -> usize {
        self.inner.rows()
    }

    /// Gets the number of columns.
    pub fn n_cols(&self) -> usize {
        self.inner.cols()
    }

    /// Gets the number of stored entries.
    pub fn nnz(&self) -> usize {
        self.inner.nnz()
    }

    /// Returns `(n_rows, n_cols)`.
    pub fn shape(&self) -> (usize, usize) {
        self.inner.shape()
    }

    /// Borrows the underlying CSR matrix.
    pub fn as_csmat(&self) -> &CsMat<f64> {
        &self.inner
    }

    /// Appends a row given as `(column, value)` pairs.
    ///
    /// Entries are sorted by column and zeros are skipped.
    ///
    /// # Errors
    ///
    /// [`RlevError::InvalidArgument`] is returned if a column is out of range or appears twice.
    pub fn push_row<I>(&mut self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (u32, f64)>,
    {
        let n_cols = self.n_cols();
        let mut row = vec![];
        for (c, v) in entries {
            if v != 0.0 {
                row.push((usize::try_from(c)?, v));
            }
        }
        row.sort_unstable_by_key(|&(c, _)| c);
        for pair in row.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(RlevError::invalid_argument(
                    "entries",
                    format!("duplicated column {}", pair[0].0),
                ));
            }
        }
        if let Some(&(c, _)) = row.last() {
            if c >= n_cols {
                return Err(RlevError::invalid_argument(
                    "entries",
                    format!("column {c} is out of range (n_cols = {n_cols})"),
                ));
            }
        }
        let (indices, data): (Vec<usize>, Vec<f64>) = row.into_iter().unzip();
        let row = CsVec::new(n_cols, indices, data);
        let empty = CsMat::empty(CompressedStorage::CSR, n_cols);
        let inner = std::mem::replace(&mut self.inner, empty);
        self.inner = inner.append_outer_csvec(row.view());
        Ok(())
    }

    /// Gets the `(column, value)` pairs of the `i`-th row, or `None` if `i` is out of range.
    pub fn row(&self, i: usize) -> Option<Vec<(u32, f64)>> {
        self.inner
            .outer_view(i)
            .map(|row| row.iter().map(|(c, &v)| (c as u32, v)).collect())
    }

    /// Iterates over the rows as `(column, value)` pair vectors.
    pub fn rows(&self) -> impl Iterator<Item = Vec<(u32, f64)>> + '_ {
        self.inner
            .outer_iterator()
            .map(|row| row.iter().map(|(c, &v)| (c as u32, v)).collect())
    }

    /// Gets the number of nonzero entries of each row.
    pub fn row_nnz(&self) -> Vec<usize> {
        self.inner.outer_iterator().map(|row| row.nnz()).collect()
    }

    /// Concatenates `self` and `other` horizontally.
    ///
    /// # Errors
    ///
    /// [`RlevError::DimensionMismatch`] is returned if the row counts differ.
    pub fn hstack(&self, other: &Self) -> Result<Self> {
        if self.n_rows() != other.n_rows() {
            return Err(RlevError::dimension_mismatch(
                "rows",
                self.n_rows(),
                other.n_rows(),
            ));
        }
        if self.n_rows() == 0 {
            return Ok(Self::new(self.n_cols() + other.n_cols()));
        }
        Ok(Self {
            inner: sprs::hstack(&[self.inner.view(), other.inner.view()]),
        })
    }

    /// Appends the rows of `other` below `self`.
    ///
    /// # Errors
    ///
    /// [`RlevError::DimensionMismatch`] is returned if the column counts differ.
    pub fn append(&mut self, other: &Self) -> Result<()> {
        if self.n_cols() != other.n_cols() {
            return Err(RlevError::dimension_mismatch(
                "columns",
                self.n_cols(),
                other.n_cols(),
            ));
        }
        if other.n_rows() == 0 {
            return Ok(());
        }
        if self.n_rows() == 0 {
            self.inner = other.inner.clone();
            return Ok(());
        }
        let stacked = sprs::vstack(&[self.inner.view(), other.inner.view()]);
        self.inner = stacked;
        Ok(())
    }

    /// Keeps the rows whose entry in `mask` is `true`.
    ///
    /// # Panics
    ///
    /// Panics if the length of `mask` differs from the number of rows.
    pub fn filter_rows(&self, mask: &[bool]) -> Self {
        assert_eq!(mask.len(), self.n_rows());
        let mut inner = CsMat::empty(CompressedStorage::CSR, self.n_cols());
        for (row, &keep) in self.inner.outer_iterator().zip(mask) {
            if keep {
                inner = inner.append_outer_csvec(row);
            }
        }
        Self { inner }
    }

    pub(crate) fn to_data(&self) -> MatrixData {
        let (n_rows, n_cols) = self.shape();
        let (indptr, indices, data) = self.inner.clone().into_raw_storage();
        MatrixData {
            n_rows,
            n_cols,
            indptr,
            indices,
            data,
        }
    }

    /// Rebuilds a matrix from stored arrays, checking the CSR structure.
    pub(crate) fn from_data(data: MatrixData) -> Result<Self> {
        let MatrixData {
            n_rows,
            n_cols,
            indptr,
            indices,
            data,
        } = data;
        let inner = CsMat::try_new((n_rows, n_cols), indptr, indices, data).map_err(
            |(_, _, _, e)| RlevError::invalid_model(format!("broken sparse matrix: {e}")),
        )?;
        Ok(Self { inner })
    }
}

impl PartialEq for SparseMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.to_data() == other.to_data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SparseMatrix {
        let mut m = SparseMatrix::new(3);
        m.push_row([(2, 1.0), (0, 1.0)]).unwrap();
        m.push_row([]).unwrap();
        m.push_row([(1, 0.5)]).unwrap();
        m
    }

    #[test]
    fn test_push_row() {
        let m = sample();
        assert_eq!((3, 3), m.shape());
        assert_eq!(3, m.nnz());
        assert_eq!(Some(vec![(0, 1.0), (2, 1.0)]), m.row(0));
        assert_eq!(Some(vec![]), m.row(1));
        assert_eq!(None, m.row(3));
        assert_eq!(vec![2, 0, 1], m.row_nnz());
    }

    #[test]
    fn test_push_row_out_of_range() {
        let mut m = SparseMatrix::new(2);
        assert!(m.push_row([(2, 1.0)]).is_err());
        assert!(m.push_row([(1, 1.0), (1, 2.0)]).is_err());
        assert_eq!(0, m.n_rows());
    }

    #[test]
    fn test_hstack() {
        let left = sample();
        let mut right = SparseMatrix::new(2);
        right.push_row([(1, 3.0)]).unwrap();
        right.push_row([(0, 4.0)]).unwrap();
        right.push_row([]).unwrap();

        let m = left.hstack(&right).unwrap();
        assert_eq!((3, 5), m.shape());
        assert_eq!(Some(vec![(0, 1.0), (2, 1.0), (4, 3.0)]), m.row(0));
        assert_eq!(Some(vec![(3, 4.0)]), m.row(1));
        assert_eq!(Some(vec![(1, 0.5)]), m.row(2));

        let empty = SparseMatrix::new(3).hstack(&SparseMatrix::new(2)).unwrap();
        assert_eq!((0, 5), empty.shape());
    }

    #[test]
    fn test_hstack_mismatch() {
        let left = sample();
        let right = SparseMatrix::new(2);
        assert!(matches!(
            left.hstack(&right),
            Err(RlevError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_append_and_filter() {
        let mut m = SparseMatrix::new(3);
        m.append(&sample()).unwrap();
        m.append(&sample()).unwrap();
        assert_eq!(6, m.n_rows());
        assert_eq!(Some(vec![(1, 0.5)]), m.row(5));

        let filtered = m.filter_rows(&[true, false, false, false, true, true]);
        assert_eq!(3, filtered.n_rows());
        assert_eq!(vec![2, 0, 1], filtered.row_nnz());

        assert!(m.append(&SparseMatrix::new(4)).is_err());
    }

    #[test]
    fn test_data_round_trip_checks_structure() {
        let m = sample();
        assert_eq!(m, SparseMatrix::from_data(m.to_data()).unwrap());

        let mut broken = m.to_data();
        broken.indices[0] = 7;
        assert!(SparseMatrix::from_data(broken).is_err());
    }
}
