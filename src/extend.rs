//! Associative Extension of Bounded-Arity Operators
//!
//! Signal primitives such as `add` and `mul` accept at most a handful of
//! operands. [`AssociativeExtend`] lifts any associative operator with a
//! bounded arity to an arbitrary number of operands:
//!
//! ```text
//! [x0 .. x7] [x8 .. x15] ... [xk ..]      groups of at most `arity`
//!     |           |              |
//!    op          op             op         one value per group
//!     \__________ | ____________/
//!                op                        repeated until one value is left
//! ```
//!
//! Groups are contiguous and keep their order, so operators that are
//! associative but not commutative (e.g. concatenation) still give the same
//! result as one flat application.

use crate::error::VocoderError;

/// Arity limit of the primitive signal operators
pub const DEFAULT_ARITY: usize = 8;

/// An associative operator of bounded arity, extended to any operand count.
#[derive(Debug, Clone, Copy)]
pub struct AssociativeExtend<F> {
    arity: usize,
    op: F,
}

impl<F> AssociativeExtend<F> {
    /// Wrap `op`, which accepts between 1 and `arity` operands.
    pub fn new(arity: usize, op: F) -> Result<Self, VocoderError> {
        if arity < 2 {
            return Err(VocoderError::InvalidArity(arity));
        }
        Ok(Self { arity, op })
    }

    /// Wrap `op` with the default arity of 8.
    pub fn with_default_arity(op: F) -> Self {
        Self {
            arity: DEFAULT_ARITY,
            op,
        }
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Reduce `operands` with the operator, using `operands` itself as scratch.
    ///
    /// The contents of the slice are unspecified afterwards. Returns `None`
    /// for an empty slice. Never allocates.
    pub fn reduce_in_place<T>(&self, operands: &mut [T]) -> Option<T>
    where
        F: Fn(&[T]) -> T,
    {
        let mut len = operands.len();
        if len == 0 {
            return None;
        }

        while len > self.arity {
            let groups = len.div_ceil(self.arity);
            for g in 0..groups {
                let start = g * self.arity;
                let end = (start + self.arity).min(len);
                // g <= start, so writing slot g never clobbers an unread group
                let value = (self.op)(&operands[start..end]);
                operands[g] = value;
            }
            len = groups;
        }

        Some((self.op)(&operands[..len]))
    }

    /// Reduce `operands` with the operator. Returns `None` for an empty slice.
    pub fn reduce<T>(&self, operands: &[T]) -> Option<T>
    where
        F: Fn(&[T]) -> T,
        T: Clone,
    {
        if operands.is_empty() {
            return None;
        }
        if operands.len() <= self.arity {
            return Some((self.op)(operands));
        }
        let mut scratch = operands.to_vec();
        self.reduce_in_place(&mut scratch)
    }
}

/// Extend `op` (arity at most 8) to any number of operands.
///
/// ```rust
/// use vocoder::extend::extend;
///
/// let sum = extend(|xs: &[i64]| xs.iter().sum::<i64>());
/// let xs: Vec<i64> = (1..=10).collect();
/// assert_eq!(sum(&xs[..]), Some(55));
/// ```
pub fn extend<T, F>(op: F) -> impl Fn(&[T]) -> Option<T>
where
    F: Fn(&[T]) -> T,
    T: Clone,
{
    let extended = AssociativeExtend::with_default_arity(op);
    move |operands: &[T]| extended.reduce(operands)
}
