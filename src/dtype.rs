//! Generic numeric dispatch over the four supported value types and the two
//! supported index types.
//!
//! The kernel's hot loops are written once, generic over [`Numeric`] and
//! [`IndexInt`]; the compiler monomorphizes them for each of the eight
//! concrete combinations. [`crate::dynmatrix`] provides the tagged-variant
//! entry point for callers who only know the concrete types at runtime.

use core::fmt::Debug;

mod private {
    pub trait Sealed {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// A value type the kernel can accumulate and compare: `i32`, `i64`, `f32`,
/// or `f64`. Sealed so [`crate::dynmatrix::DynCsrMatrix`]'s dispatch table
/// stays exhaustive.
pub trait Numeric:
    Copy + PartialOrd + PartialEq + Debug + Send + Sync + num_traits::Zero + private::Sealed
{
    /// Short name used in error messages and dtype tags.
    const NAME: &'static str;

    /// The minimum finite value of this type, the selector's default
    /// threshold (spec §4.2: "all finite entries pass").
    const MIN_FINITE: Self;

    /// `acc + a * b`, wrapping on overflow for integer types (spec §4.1:
    /// "Overflow on integer accumulation is defined to wrap").
    fn mul_add_acc(acc: Self, a: Self, b: Self) -> Self;
}

impl Numeric for i32 {
    const NAME: &'static str = "i32";
    const MIN_FINITE: Self = i32::MIN;

    #[inline]
    fn mul_add_acc(acc: Self, a: Self, b: Self) -> Self {
        acc.wrapping_add(a.wrapping_mul(b))
    }
}

impl Numeric for i64 {
    const NAME: &'static str = "i64";
    const MIN_FINITE: Self = i64::MIN;

    #[inline]
    fn mul_add_acc(acc: Self, a: Self, b: Self) -> Self {
        acc.wrapping_add(a.wrapping_mul(b))
    }
}

impl Numeric for f32 {
    const NAME: &'static str = "f32";
    const MIN_FINITE: Self = f32::MIN;

    #[inline]
    fn mul_add_acc(acc: Self, a: Self, b: Self) -> Self {
        a.mul_add(b, acc)
    }
}

impl Numeric for f64 {
    const NAME: &'static str = "f64";
    const MIN_FINITE: Self = f64::MIN;

    #[inline]
    fn mul_add_acc(acc: Self, a: Self, b: Self) -> Self {
        a.mul_add(b, acc)
    }
}

/// An index type the kernel can use for `indptr`/`indices`: `i32` or `i64`.
pub trait IndexInt: num_traits::PrimInt + Debug + Send + Sync + private::Sealed {
    /// Short name used in error messages.
    const NAME: &'static str;

    /// Converts a `usize` row/column/offset into this index type.
    ///
    /// # Panics
    ///
    /// Panics if `v` does not fit; callers are expected to have chosen the
    /// index width per spec §3 before constructing matrices this large.
    #[inline]
    fn from_usize_index(v: usize) -> Self {
        Self::from(v).expect("index value exceeds the representable range of this index type")
    }

    /// Converts this index back into a `usize` for subscripting.
    #[inline]
    fn as_usize_index(self) -> usize {
        self.to_usize()
            .expect("index value must be non-negative to be used as a subscript")
    }
}

impl IndexInt for i32 {
    const NAME: &'static str = "i32";
}

impl IndexInt for i64 {
    const NAME: &'static str = "i64";
}

/// The index width to use, following spec §3: 64-bit is selected when any of
/// `nrows`, `ncols`, or the projected `nnz` may exceed `2^31 - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexWidth {
    /// Use `i32` indices.
    ThirtyTwo,
    /// Use `i64` indices.
    SixtyFour,
}

impl IndexWidth {
    /// Picks the narrowest index width that can represent every dimension.
    pub fn select(nrows: usize, ncols: usize, projected_nnz: usize) -> Self {
        const I32_MAX: usize = i32::MAX as usize;
        if nrows > I32_MAX || ncols > I32_MAX || projected_nnz > I32_MAX {
            IndexWidth::SixtyFour
        } else {
            IndexWidth::ThirtyTwo
        }
    }
}
