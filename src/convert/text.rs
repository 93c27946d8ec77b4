//! String conversions to and from the scalar types.

use super::numeric::{code_unit, integral, narrow_to_float, Number};
use super::{Concern, ConversionMatrix, Failure};
use crate::model::{FieldType, Value};

const NONE: &[Concern] = &[];
const FORMAT: &[Concern] = &[Concern::Format];
const FORMAT_RANGE: &[Concern] = &[Concern::Format, Concern::Range];
const FORMAT_RANGE_LOSS: &[Concern] = &[Concern::Format, Concern::Range, Concern::Loss];

const FALSE_LITERALS: [&str; 3] = ["0", "f", "false"];
const TRUE_LITERALS: [&str; 3] = ["1", "t", "true"];

pub(super) fn register(matrix: &mut ConversionMatrix) {
    use FieldType::*;

    matrix.add(String, Boolean, FORMAT, parse_boolean);
    matrix.add(String, Byte, FORMAT_RANGE_LOSS, parse_byte);
    matrix.add(String, Char, FORMAT_RANGE, parse_char);
    matrix.add(String, Short, FORMAT_RANGE_LOSS, parse_short);
    matrix.add(String, Integer, FORMAT_RANGE_LOSS, parse_int);
    matrix.add(String, Long, FORMAT_RANGE_LOSS, parse_long);
    matrix.add(String, Float, FORMAT_RANGE, parse_float);
    matrix.add(String, Double, FORMAT, parse_double);

    for source in [Boolean, Byte, Char, Short, Integer, Long, Float, Double, Date, Time, DateTime, LocalDateTime] {
        matrix.add(source, String, NONE, to_text);
    }
}

fn text(value: &Value) -> Result<&str, Failure> {
    value.as_str().map(str::trim).ok_or_else(|| Failure::unsupported(value))
}

fn to_text(value: &Value, _: Option<&str>) -> Result<Value, Failure> {
    Ok(Value::String(value.to_string()))
}

/// Strict: only `0/f/false` and `1/t/true`, case-insensitive.
fn parse_boolean(value: &Value, _: Option<&str>) -> Result<Value, Failure> {
    let s = text(value)?.to_ascii_lowercase();
    if TRUE_LITERALS.contains(&s.as_str()) {
        Ok(Value::Bool(true))
    } else if FALSE_LITERALS.contains(&s.as_str()) {
        Ok(Value::Bool(false))
    } else {
        Err(Failure::format(format!("'{s}' is not a boolean literal")))
    }
}

/// Integer literal, or a decimal literal truncated toward zero.
fn parse_integral(value: &Value, target: FieldType, min: i64, max: i64) -> Result<i64, Failure> {
    let s = text(value)?;
    let number = match s.parse::<i64>() {
        Ok(v) => Number::Integral(v),
        Err(_) => match s.parse::<f64>() {
            Ok(v) if v.is_finite() => Number::Floating(v),
            _ => return Err(Failure::format(format!("'{s}' is not a valid {target}"))),
        },
    };
    integral(number, min, max, target)
}

fn parse_byte(value: &Value, _: Option<&str>) -> Result<Value, Failure> {
    parse_integral(value, FieldType::Byte, i8::MIN as i64, i8::MAX as i64).map(|v| Value::Byte(v as i8))
}

fn parse_short(value: &Value, _: Option<&str>) -> Result<Value, Failure> {
    parse_integral(value, FieldType::Short, i16::MIN as i64, i16::MAX as i64)
        .map(|v| Value::Short(v as i16))
}

fn parse_int(value: &Value, _: Option<&str>) -> Result<Value, Failure> {
    parse_integral(value, FieldType::Integer, i32::MIN as i64, i32::MAX as i64)
        .map(|v| Value::Int(v as i32))
}

fn parse_long(value: &Value, _: Option<&str>) -> Result<Value, Failure> {
    parse_integral(value, FieldType::Long, i64::MIN, i64::MAX).map(Value::Long)
}

/// Exactly one character in the 16-bit code unit domain.
fn parse_char(value: &Value, _: Option<&str>) -> Result<Value, Failure> {
    let s = value.as_str().ok_or_else(|| Failure::unsupported(value))?;
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if (c as u32) <= 0xFFFF => code_unit(c as i64),
        (Some(c), None) => Err(Failure::range(format!("'{c}' is outside the char range"))),
        _ => Err(Failure::format(format!("'{s}' is not a single character"))),
    }
}

fn parse_f64(value: &Value, target: FieldType) -> Result<f64, Failure> {
    let s = text(value)?;
    s.parse::<f64>().map_err(|_| Failure::format(format!("'{s}' is not a valid {target}")))
}

fn parse_float(value: &Value, _: Option<&str>) -> Result<Value, Failure> {
    narrow_to_float(parse_f64(value, FieldType::Float)?).map(Value::Float)
}

fn parse_double(value: &Value, _: Option<&str>) -> Result<Value, Failure> {
    parse_f64(value, FieldType::Double).map(Value::Double)
}
