//! Exact decimal arithmetic used by the aggregate and distribution functions
//!
//! Every numeric window result is computed in base-10 with `rust_decimal`, never
//! in binary floating point, so that repeated add/subtract while a frame slides
//! cannot drift. Rounding happens exactly once, when a result is emitted.

use crate::common::constants::MAX_DECIMAL_SCALE;
use crate::common::error::{WindowError, WindowResult};
use num_traits::FromPrimitive;
use ordered_float::OrderedFloat;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Rounding applied when a result is cut down to its output scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Round half away from zero (0.125 -> 0.13)
    #[default]
    HalfUp,
    /// Banker's rounding (0.125 -> 0.12)
    HalfEven,
    /// Round half toward zero (0.125 -> 0.12)
    HalfDown,
    /// Away from zero
    Up,
    /// Toward zero (truncate)
    Down,
    /// Toward positive infinity
    Ceiling,
    /// Toward negative infinity
    Floor,
}

impl RoundingMode {
    pub fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
            RoundingMode::HalfDown => RoundingStrategy::MidpointTowardZero,
            RoundingMode::Up => RoundingStrategy::AwayFromZero,
            RoundingMode::Down => RoundingStrategy::ToZero,
            RoundingMode::Ceiling => RoundingStrategy::ToPositiveInfinity,
            RoundingMode::Floor => RoundingStrategy::ToNegativeInfinity,
        }
    }
}

/// Conversion of a field value into an exact decimal
///
/// `None` converts to zero, so nullable fields contribute nothing to a SUM
/// while still occupying a row of the frame.
pub trait ToDecimal {
    fn to_decimal(&self) -> WindowResult<Decimal>;
}

macro_rules! impl_to_decimal_for_int {
    ($($t:ty),*) => {
        $(
            impl ToDecimal for $t {
                fn to_decimal(&self) -> WindowResult<Decimal> {
                    Ok(Decimal::from(*self))
                }
            }
        )*
    };
}

impl_to_decimal_for_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl ToDecimal for Decimal {
    fn to_decimal(&self) -> WindowResult<Decimal> {
        Ok(*self)
    }
}

impl ToDecimal for f64 {
    fn to_decimal(&self) -> WindowResult<Decimal> {
        Decimal::from_f64(*self).ok_or_else(|| {
            WindowError::Extraction(format!("{} cannot be represented as a decimal", self))
        })
    }
}

impl ToDecimal for f32 {
    fn to_decimal(&self) -> WindowResult<Decimal> {
        Decimal::from_f32(*self).ok_or_else(|| {
            WindowError::Extraction(format!("{} cannot be represented as a decimal", self))
        })
    }
}

impl ToDecimal for OrderedFloat<f64> {
    fn to_decimal(&self) -> WindowResult<Decimal> {
        self.0.to_decimal()
    }
}

impl<V: ToDecimal> ToDecimal for Option<V> {
    fn to_decimal(&self) -> WindowResult<Decimal> {
        match self {
            Some(v) => v.to_decimal(),
            None => Ok(Decimal::ZERO),
        }
    }
}

impl<V: ToDecimal + ?Sized> ToDecimal for &V {
    fn to_decimal(&self) -> WindowResult<Decimal> {
        (**self).to_decimal()
    }
}

fn check_scale(scale: u32) -> WindowResult<()> {
    if scale > MAX_DECIMAL_SCALE {
        return Err(WindowError::InvalidArgument(format!(
            "scale {} exceeds the maximum of {}",
            scale, MAX_DECIMAL_SCALE
        )));
    }
    Ok(())
}

/// Round `value` to exactly `scale` fractional digits
pub fn round(value: Decimal, scale: u32, mode: RoundingMode) -> WindowResult<Decimal> {
    check_scale(scale)?;
    let mut rounded = value.round_dp_with_strategy(scale, mode.strategy());
    rounded.rescale(scale);
    Ok(rounded)
}

/// Divide and round the quotient to exactly `scale` fractional digits
pub fn divide(
    numerator: Decimal,
    denominator: Decimal,
    scale: u32,
    mode: RoundingMode,
) -> WindowResult<Decimal> {
    if denominator.is_zero() {
        return Err(WindowError::InvalidArgument(format!(
            "division of {} by zero",
            numerator
        )));
    }
    let quotient = numerator.checked_div(denominator).ok_or_else(|| {
        WindowError::Overflow(format!("{} / {} overflows", numerator, denominator))
    })?;
    round(quotient, scale, mode)
}

/// Integer ratio `numerator / denominator` as a decimal with `scale` digits
pub fn ratio(numerator: usize, denominator: usize, scale: u32, mode: RoundingMode) -> WindowResult<Decimal> {
    divide(Decimal::from(numerator), Decimal::from(denominator), scale, mode)
}

pub fn checked_add(a: Decimal, b: Decimal) -> WindowResult<Decimal> {
    a.checked_add(b)
        .ok_or_else(|| WindowError::Overflow(format!("{} + {} overflows", a, b)))
}

pub fn checked_sub(a: Decimal, b: Decimal) -> WindowResult<Decimal> {
    a.checked_sub(b)
        .ok_or_else(|| WindowError::Overflow(format!("{} - {} overflows", a, b)))
}
