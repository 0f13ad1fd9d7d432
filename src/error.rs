//! Error types shared by every fallible tree operation.
//!
//! Nothing in this crate panics or unwinds to report a failure. Operations
//! that may allocate or construct a value return a [`Result`], and callers
//! check it before trusting the accompanying position. "Not found" is never
//! an error: lookups report it through the end position.

use std::fmt;

/// Returned by an [`Allocator`](crate::alloc::Allocator) that cannot satisfy a request.
///
/// # Examples
///
/// ```rust
/// use rbcore::error::{AllocError, Error};
///
/// let error: Error = AllocError.into();
/// assert_eq!(error, Error::NotEnoughMemory);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AllocError;

impl fmt::Display for AllocError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("memory allocation failed")
    }
}

impl std::error::Error for AllocError {}

/// The error taxonomy of the fallible-operation protocol.
///
/// # Examples
///
/// ```rust
/// use rbcore::error::Error;
///
/// assert_eq!(format!("{}", Error::NotEnoughMemory), "not enough memory");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// The allocator refused to hand out memory for a node.
    NotEnoughMemory,
    /// A value could not be built from the supplied arguments.
    InvalidArgument,
    /// A length or count exceeded what the container can address.
    ValueTooLarge,
}

impl Error {
    /// Returns a short, static description of the error.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotEnoughMemory => "not enough memory",
            Self::InvalidArgument => "invalid argument",
            Self::ValueTooLarge => "value too large",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl std::error::Error for Error {}

impl From<AllocError> for Error {
    fn from(_: AllocError) -> Self {
        Self::NotEnoughMemory
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(_: std::collections::TryReserveError) -> Self {
        Self::NotEnoughMemory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Error::NotEnoughMemory, "not enough memory")]
    #[case(Error::InvalidArgument, "invalid argument")]
    #[case(Error::ValueTooLarge, "value too large")]
    fn test_display(#[case] error: Error, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    fn test_alloc_error_converts_to_not_enough_memory() {
        assert_eq!(Error::from(AllocError), Error::NotEnoughMemory);
    }

    #[rstest]
    fn test_try_reserve_error_converts_to_not_enough_memory() {
        let mut buffer: Vec<u64> = Vec::new();
        let reserve_error = buffer
            .try_reserve(usize::MAX)
            .expect_err("reserving usize::MAX elements must fail");
        assert_eq!(Error::from(reserve_error), Error::NotEnoughMemory);
    }
}
