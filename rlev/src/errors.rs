//! Definition of errors.

use std::error::Error;
use std::fmt;

pub type Result<T, E = RlevError> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum RlevError {
    InvalidModel(InvalidModelError),
    InvalidArgument(InvalidArgumentError),
    InvalidLabel(InvalidLabelError),
    DimensionMismatch(DimensionMismatchError),
    CastError(std::num::TryFromIntError),
    DecodeError(bincode::error::DecodeError),
    EncodeError(bincode::error::EncodeError),
    IOError(std::io::Error),
}

impl RlevError {
    pub(crate) fn invalid_model<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidModel(InvalidModelError { msg: msg.into() })
    }

    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    pub(crate) fn invalid_label<S>(line: usize, label: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidLabel(InvalidLabelError {
            line,
            label: label.into(),
        })
    }

    pub(crate) fn dimension_mismatch(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch(DimensionMismatchError {
            what,
            expected,
            actual,
        })
    }
}

impl fmt::Display for RlevError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidModel(e) => e.fmt(f),
            Self::InvalidArgument(e) => e.fmt(f),
            Self::InvalidLabel(e) => e.fmt(f),
            Self::DimensionMismatch(e) => e.fmt(f),
            Self::CastError(e) => e.fmt(f),
            Self::DecodeError(e) => e.fmt(f),
            Self::EncodeError(e) => e.fmt(f),
            Self::IOError(e) => e.fmt(f),
        }
    }
}

impl Error for RlevError {}

/// Error used when a model or another serialized artifact is inconsistent.
#[derive(Debug)]
pub struct InvalidModelError {
    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidModelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidModelError: {}", self.msg)
    }
}

impl Error for InvalidModelError {}

/// Error used when the argument is invalid.
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// Name of the argument.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// Error used when a relevance label cannot be parsed or is out of range.
#[derive(Debug)]
pub struct InvalidLabelError {
    /// 1-indexed line number of the input.
    pub(crate) line: usize,

    /// The rejected label text.
    pub(crate) label: String,
}

impl InvalidLabelError {
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for InvalidLabelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "InvalidLabelError: line {}: {:?} is not a relevance level in 1..={}",
            self.line,
            self.label,
            crate::record::MAX_RLEV
        )
    }
}

impl Error for InvalidLabelError {}

/// Error used when two components disagree on a dimension.
#[derive(Debug)]
pub struct DimensionMismatchError {
    /// What is counted, e.g., `"classes"` or `"features"`.
    pub(crate) what: &'static str,

    pub(crate) expected: usize,
    pub(crate) actual: usize,
}

impl DimensionMismatchError {
    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn actual(&self) -> usize {
        self.actual
    }
}

impl fmt::Display for DimensionMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "DimensionMismatchError: {}: expected {}, got {}",
            self.what, self.expected, self.actual
        )
    }
}

impl Error for DimensionMismatchError {}

impl From<std::num::TryFromIntError> for RlevError {
    fn from(error: std::num::TryFromIntError) -> Self {
        Self::CastError(error)
    }
}

impl From<bincode::error::DecodeError> for RlevError {
    fn from(error: bincode::error::DecodeError) -> Self {
        Self::DecodeError(error)
    }
}

impl From<bincode::error::EncodeError> for RlevError {
    fn from(error: bincode::error::EncodeError) -> Self {
        Self::EncodeError(error)
    }
}

impl From<std::io::Error> for RlevError {
    fn from(error: std::io::Error) -> Self {
        Self::IOError(error)
    }
}
