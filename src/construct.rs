//! The construct/assign capability.
//!
//! Copying a tree copies every stored value, and copying a value may fail.
//! [`TryClone`] is the fallible counterpart of [`Clone`]: `try_clone` is the
//! fallible construction from an existing value, `try_clone_from` the
//! fallible assignment.

use crate::error::Error;
use std::rc::Rc;
use std::sync::Arc;

/// Fallible copy construction and assignment.
///
/// # Examples
///
/// ```rust
/// use rbcore::construct::TryClone;
/// use rbcore::error::Error;
///
/// #[derive(Debug, PartialEq)]
/// struct Even(u32);
///
/// impl TryClone for Even {
///     fn try_clone(&self) -> Result<Self, Error> {
///         if self.0 % 2 == 0 { Ok(Self(self.0)) } else { Err(Error::InvalidArgument) }
///     }
/// }
///
/// assert_eq!(Even(4).try_clone(), Ok(Even(4)));
/// assert_eq!(Even(3).try_clone(), Err(Error::InvalidArgument));
/// ```
pub trait TryClone: Sized {
    /// Builds a copy of `self`.
    ///
    /// # Errors
    ///
    /// Returns the error reported while building the copy.
    fn try_clone(&self) -> Result<Self, Error>;

    /// Overwrites `self` with a copy of `source`.
    ///
    /// On failure `self` keeps its previous value.
    ///
    /// # Errors
    ///
    /// Returns the error reported while building the copy.
    fn try_clone_from(&mut self, source: &Self) -> Result<(), Error> {
        *self = source.try_clone()?;
        Ok(())
    }
}

macro_rules! impl_try_clone_via_clone {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TryClone for $ty {
                #[inline]
                fn try_clone(&self) -> Result<Self, Error> {
                    Ok(self.clone())
                }
            }
        )*
    };
}

impl_try_clone_via_clone!(
    bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, (),
    &'static str,
);

impl TryClone for String {
    fn try_clone(&self) -> Result<Self, Error> {
        let mut copy = Self::new();
        copy.try_reserve_exact(self.len())?;
        copy.push_str(self);
        Ok(copy)
    }
}

impl<T: TryClone> TryClone for Vec<T> {
    fn try_clone(&self) -> Result<Self, Error> {
        let mut copy = Self::new();
        copy.try_reserve_exact(self.len())?;
        for element in self {
            copy.push(element.try_clone()?);
        }
        Ok(copy)
    }
}

impl<T: TryClone> TryClone for Option<T> {
    fn try_clone(&self) -> Result<Self, Error> {
        self.as_ref().map(TryClone::try_clone).transpose()
    }
}

impl<T: ?Sized> TryClone for Rc<T> {
    fn try_clone(&self) -> Result<Self, Error> {
        Ok(Self::clone(self))
    }
}

impl<T: ?Sized> TryClone for Arc<T> {
    fn try_clone(&self) -> Result<Self, Error> {
        Ok(Self::clone(self))
    }
}

impl<A: TryClone, B: TryClone> TryClone for (A, B) {
    fn try_clone(&self) -> Result<Self, Error> {
        Ok((self.0.try_clone()?, self.1.try_clone()?))
    }
}

impl<A: TryClone, B: TryClone, C: TryClone> TryClone for (A, B, C) {
    fn try_clone(&self) -> Result<Self, Error> {
        Ok((self.0.try_clone()?, self.1.try_clone()?, self.2.try_clone()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, PartialEq)]
    struct Refusing;

    impl TryClone for Refusing {
        fn try_clone(&self) -> Result<Self, Error> {
            Err(Error::InvalidArgument)
        }
    }

    #[rstest]
    fn test_primitive_try_clone() {
        assert_eq!(42_i32.try_clone(), Ok(42));
        assert_eq!('x'.try_clone(), Ok('x'));
    }

    #[rstest]
    fn test_string_try_clone() {
        let original = "hello".to_string();
        assert_eq!(original.try_clone(), Ok("hello".to_string()));
    }

    #[rstest]
    fn test_vec_try_clone_propagates_element_failure() {
        let values = vec![Refusing, Refusing];
        assert_eq!(values.try_clone(), Err(Error::InvalidArgument));
    }

    #[rstest]
    fn test_tuple_try_clone() {
        let pair = (1_u8, "one".to_string());
        assert_eq!(pair.try_clone(), Ok((1_u8, "one".to_string())));
    }

    #[rstest]
    fn test_try_clone_from_keeps_old_value_on_failure() {
        let mut target = Some(Refusing);
        let source = Some(Refusing);
        assert_eq!(target.try_clone_from(&source), Err(Error::InvalidArgument));
        assert_eq!(target, Some(Refusing));
    }

    #[rstest]
    fn test_try_clone_from_overwrites() {
        let mut target = vec![1, 2, 3];
        target.try_clone_from(&vec![9]).unwrap();
        assert_eq!(target, vec![9]);
    }
}
