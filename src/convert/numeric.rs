//! Numeric and boolean conversions.
//!
//! Integral targets are range-checked against `[MIN, MAX]`. Floating
//! sources are truncated toward zero before the check. `char` is treated as
//! a 16-bit code unit: `0..=0xFFFF`, surrogates excluded.

use super::{Concern, ConversionMatrix, Failure};
use crate::model::{FieldType, Value};

const NONE: &[Concern] = &[];
const RANGE: &[Concern] = &[Concern::Range];
const LOSS: &[Concern] = &[Concern::Loss];
const RANGE_LOSS: &[Concern] = &[Concern::Range, Concern::Loss];

const SURROGATES: std::ops::RangeInclusive<i64> = 0xD800..=0xDFFF;

/// Boolean plus the numeric types.
const KINDS: [FieldType; 8] = [
    FieldType::Boolean,
    FieldType::Byte,
    FieldType::Char,
    FieldType::Short,
    FieldType::Integer,
    FieldType::Long,
    FieldType::Float,
    FieldType::Double,
];

pub(super) fn register(matrix: &mut ConversionMatrix) {
    for source in KINDS {
        for target in KINDS {
            if source == target {
                continue;
            }
            let func: super::ConvertFn = match target {
                FieldType::Boolean => to_boolean,
                FieldType::Byte => to_byte,
                FieldType::Char => to_char,
                FieldType::Short => to_short,
                FieldType::Integer => to_int,
                FieldType::Long => to_long,
                FieldType::Float => to_float,
                _ => to_double,
            };
            matrix.add(source, target, concerns(source, target), func);
        }
    }
}

/// Inclusive integral domain of a type; `None` for floating types.
fn domain(t: FieldType) -> Option<(i64, i64)> {
    match t {
        FieldType::Boolean => Some((0, 1)),
        FieldType::Byte => Some((i8::MIN as i64, i8::MAX as i64)),
        FieldType::Char => Some((0, 0xFFFF)),
        FieldType::Short => Some((i16::MIN as i64, i16::MAX as i64)),
        FieldType::Integer => Some((i32::MIN as i64, i32::MAX as i64)),
        FieldType::Long => Some((i64::MIN, i64::MAX)),
        _ => None,
    }
}

fn concerns(source: FieldType, target: FieldType) -> &'static [Concern] {
    match target {
        FieldType::Boolean => LOSS,
        FieldType::Float => match source {
            FieldType::Integer | FieldType::Long => LOSS,
            FieldType::Double => RANGE_LOSS,
            _ => NONE,
        },
        FieldType::Double => match source {
            FieldType::Long => LOSS,
            _ => NONE,
        },
        _ => match (domain(source), domain(target)) {
            (None, _) => RANGE_LOSS,
            (Some((smin, smax)), Some((tmin, tmax))) if smin >= tmin && smax <= tmax => NONE,
            _ => RANGE,
        },
    }
}

// ============================================================================
// Source extraction
// ============================================================================

pub(super) enum Number {
    Integral(i64),
    Floating(f64),
}

pub(super) fn number(value: &Value) -> Option<Number> {
    match value {
        Value::Bool(b) => Some(Number::Integral(*b as i64)),
        Value::Char(c) => Some(Number::Integral(*c as i64)),
        Value::Float(v) => Some(Number::Floating(*v as f64)),
        Value::Double(v) => Some(Number::Floating(*v)),
        other => other.as_long().map(Number::Integral),
    }
}

/// Range-check into `[min, max]`, truncating floating input.
pub(super) fn integral(n: Number, min: i64, max: i64, target: FieldType) -> Result<i64, Failure> {
    match n {
        Number::Integral(v) if v < min || v > max => {
            Err(Failure::range(format!("{v} is outside the {target} range [{min}, {max}]")))
        }
        Number::Integral(v) => Ok(v),
        Number::Floating(v) => {
            let t = v.trunc();
            if v.is_nan() || t < min as f64 || t >= max as f64 + 1.0 {
                Err(Failure::range(format!("{v} is outside the {target} range [{min}, {max}]")))
            } else {
                Ok(t as i64)
            }
        }
    }
}

fn checked(value: &Value, target: FieldType) -> Result<i64, Failure> {
    let n = number(value).ok_or_else(|| Failure::unsupported(value))?;
    let (min, max) = domain(target).ok_or_else(|| Failure::unsupported(value))?;
    integral(n, min, max, target)
}

// ============================================================================
// Targets
// ============================================================================

fn to_boolean(value: &Value, _: Option<&str>) -> Result<Value, Failure> {
    match number(value) {
        Some(Number::Integral(v)) => Ok(Value::Bool(v != 0)),
        Some(Number::Floating(v)) => Ok(Value::Bool(v != 0.0)),
        None => Err(Failure::unsupported(value)),
    }
}

fn to_byte(value: &Value, _: Option<&str>) -> Result<Value, Failure> {
    checked(value, FieldType::Byte).map(|v| Value::Byte(v as i8))
}

fn to_short(value: &Value, _: Option<&str>) -> Result<Value, Failure> {
    checked(value, FieldType::Short).map(|v| Value::Short(v as i16))
}

fn to_int(value: &Value, _: Option<&str>) -> Result<Value, Failure> {
    checked(value, FieldType::Integer).map(|v| Value::Int(v as i32))
}

fn to_long(value: &Value, _: Option<&str>) -> Result<Value, Failure> {
    checked(value, FieldType::Long).map(Value::Long)
}

fn to_char(value: &Value, _: Option<&str>) -> Result<Value, Failure> {
    let code = checked(value, FieldType::Char)?;
    code_unit(code)
}

pub(super) fn code_unit(code: i64) -> Result<Value, Failure> {
    if SURROGATES.contains(&code) {
        return Err(Failure::range(format!("{code:#06x} is a surrogate code unit")));
    }
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .map(Value::Char)
        .ok_or_else(|| Failure::range(format!("{code} is not a valid char")))
}

fn to_float(value: &Value, _: Option<&str>) -> Result<Value, Failure> {
    match number(value) {
        Some(Number::Integral(v)) => Ok(Value::Float(v as f32)),
        Some(Number::Floating(v)) => narrow_to_float(v).map(Value::Float),
        None => Err(Failure::unsupported(value)),
    }
}

/// Magnitudes above `f32::MAX` fail; magnitudes below the smallest positive
/// subnormal become zero.
pub(super) fn narrow_to_float(v: f64) -> Result<f32, Failure> {
    let min_subnormal = f32::from_bits(1) as f64;
    if v.is_finite() && v.abs() > f32::MAX as f64 {
        return Err(Failure::range(format!("{v} exceeds the float range")));
    }
    if v != 0.0 && v.abs() < min_subnormal {
        return Ok(0.0);
    }
    Ok(v as f32)
}

fn to_double(value: &Value, _: Option<&str>) -> Result<Value, Failure> {
    match number(value) {
        Some(Number::Integral(v)) => Ok(Value::Double(v as f64)),
        Some(Number::Floating(v)) => Ok(Value::Double(v)),
        None => Err(Failure::unsupported(value)),
    }
}
