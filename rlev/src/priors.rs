//! Empirical class distribution.

use std::io::{BufRead, Read, Write};

use bincode::{Decode, Encode};

use crate::errors::{Result, RlevError};
use crate::record::{parse_rlev, MAX_RLEV};

// Allowed deviation of the sum of stored priors from 1.
const SUM_TOLERANCE: f64 = 1e-6;

/// Reads 1-indexed labels, one per line in the first tab-separated column.
///
/// Blank lines are skipped.
///
/// # Errors
///
/// [`RlevError::InvalidLabel`] is returned for the first label that is not an integer in
/// `1..=MAX_RLEV`. When `rdr` generates an error, it will be returned as is.
pub fn read_labels<R>(rdr: R) -> Result<Vec<u32>>
where
    R: BufRead,
{
    let mut labels = vec![];
    for (i, line) in rdr.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let field = line.split('\t').next().unwrap_or_default();
        let rlev = parse_rlev(field).ok_or_else(|| RlevError::invalid_label(i + 1, field))?;
        labels.push(rlev);
    }
    Ok(labels)
}

/// Class frequencies indexed by 0-indexed class id.
#[derive(Clone, Debug, PartialEq, Decode, Encode)]
pub struct Priors {
    probs: Vec<f64>,
}

impl Priors {
    /// Estimates priors from 1-indexed labels.
    ///
    /// The result has `max(label)` elements. `smoothing` is added to every class count before
    /// normalizing; with 0, classes that never occur get exactly 0.
    ///
    /// # Errors
    ///
    /// [`RlevError::InvalidArgument`] is returned if `labels` is empty, contains a label
    /// outside `1..=MAX_RLEV`, or `smoothing` is negative or not finite.
    pub fn from_labels<I>(labels: I, smoothing: f64) -> Result<Self>
    where
        I: IntoIterator<Item = u32>,
    {
        if !smoothing.is_finite() || smoothing < 0.0 {
            return Err(RlevError::invalid_argument(
                "smoothing",
                "must be a non-negative finite number",
            ));
        }
        let mut counts: Vec<u64> = vec![];
        for rlev in labels {
            if !(1..=MAX_RLEV).contains(&rlev) {
                return Err(RlevError::invalid_argument(
                    "labels",
                    format!("label {rlev} is not in 1..={MAX_RLEV}"),
                ));
            }
            let cls = usize::try_from(rlev - 1)?;
            if counts.len() <= cls {
                counts.resize(cls + 1, 0);
            }
            counts[cls] += 1;
        }
        if counts.is_empty() {
            return Err(RlevError::invalid_argument("labels", "no label is given"));
        }
        let total: f64 = counts.iter().map(|&c| c as f64 + smoothing).sum();
        let probs = counts
            .into_iter()
            .map(|c| (c as f64 + smoothing) / total)
            .collect();
        Ok(Self { probs })
    }

    fn validate(&self) -> Result<()> {
        if self.probs.is_empty() {
            return Err(RlevError::invalid_model("priors are empty"));
        }
        if self.probs.len() > usize::try_from(MAX_RLEV)? {
            return Err(RlevError::invalid_model(format!(
                "{} priors exceed the largest relevance level",
                self.probs.len()
            )));
        }
        if let Some(p) = self.probs.iter().find(|p| !p.is_finite() || **p < 0.0) {
            return Err(RlevError::invalid_model(format!("invalid prior {p}")));
        }
        let sum: f64 = self.probs.iter().sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(RlevError::invalid_model(format!("priors sum to {sum}, not 1")));
        }
        Ok(())
    }

    /// Gets the number of classes.
    pub fn len(&self) -> usize {
        self.probs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.probs
    }

    /// Exports the priors.
    ///
    /// # Errors
    ///
    /// When `wtr` generates an error, it will be returned as is.
    pub fn write<W>(&self, wtr: &mut W) -> Result<()>
    where
        W: Write,
    {
        bincode::encode_into_std_write(self, wtr, bincode::config::standard())?;
        Ok(())
    }

    /// Reads priors from a reader.
    ///
    /// # Errors
    ///
    /// [`RlevError::InvalidModel`] is returned if the stored values are not a probability
    /// distribution. When `rdr` generates an error, it will be returned as is.
    pub fn read<R>(rdr: &mut R) -> Result<Self>
    where
        R: Read,
    {
        let priors: Self = bincode::decode_from_std_read(rdr, bincode::config::standard())?;
        priors.validate()?;
        Ok(priors)
    }
}
