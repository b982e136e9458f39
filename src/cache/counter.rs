//! Counter Module
//!
//! Increment/decrement over the closed set of integer kinds. The step is
//! computed in a widened signed integer and narrowed back with a checked
//! conversion, so a counter never changes type and never wraps.

use crate::cache::{IntKind, Integer, Value};
use crate::error::{CacheError, Result};

/// Direction of a counter update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Incr,
    Decr,
}

impl Step {
    fn delta(self) -> i128 {
        match self {
            Step::Incr => 1,
            Step::Decr => -1,
        }
    }
}

impl Integer {
    /// Lossless widening used for the arithmetic step.
    pub fn widen(self) -> i128 {
        match self {
            Integer::I8(v) => v.into(),
            Integer::I16(v) => v.into(),
            Integer::I32(v) => v.into(),
            Integer::I64(v) => v.into(),
            Integer::Isize(v) => v as i128,
            Integer::U8(v) => v.into(),
            Integer::U16(v) => v.into(),
            Integer::U32(v) => v.into(),
            Integer::U64(v) => v.into(),
            Integer::Usize(v) => v as i128,
        }
    }

    /// Narrows back into `kind`, or `None` if out of range.
    pub fn narrow(kind: IntKind, wide: i128) -> Option<Integer> {
        match kind {
            IntKind::I8 => i8::try_from(wide).ok().map(Integer::I8),
            IntKind::I16 => i16::try_from(wide).ok().map(Integer::I16),
            IntKind::I32 => i32::try_from(wide).ok().map(Integer::I32),
            IntKind::I64 => i64::try_from(wide).ok().map(Integer::I64),
            IntKind::Isize => isize::try_from(wide).ok().map(Integer::Isize),
            IntKind::U8 => u8::try_from(wide).ok().map(Integer::U8),
            IntKind::U16 => u16::try_from(wide).ok().map(Integer::U16),
            IntKind::U32 => u32::try_from(wide).ok().map(Integer::U32),
            IntKind::U64 => u64::try_from(wide).ok().map(Integer::U64),
            IntKind::Usize => usize::try_from(wide).ok().map(Integer::Usize),
        }
    }
}

/// Applies `step` to the integer held in `value`, keeping its type.
///
/// # Errors
/// - `TypeMismatch` if `value` is not an integer (floats included)
/// - `Underflow` when decrementing an unsigned counter at zero
/// - `Overflow` when the result leaves the range of the stored type
pub fn apply(key: &str, value: &Value, step: Step) -> Result<Integer> {
    let current = value.as_integer().ok_or_else(|| CacheError::TypeMismatch {
        expected: "integer counter".to_string(),
        found: value.type_name().to_string(),
    })?;

    let kind = current.kind();
    let next = current.widen() + step.delta();

    Integer::narrow(kind, next).ok_or_else(|| {
        if next < 0 && kind.is_unsigned() {
            CacheError::Underflow(key.to_string())
        } else {
            CacheError::Overflow {
                key: key.to_string(),
                kind: kind.name().to_string(),
            }
        }
    })
}
