//! Data converters applied at the end of a value rule: `{*conv1&*conv2:arg}`.

use std::net::Ipv4Addr;

use chrono::TimeDelta;
use eventex_core::{format_duration, parse_duration_with_nanos};

use crate::EvalError;

/// How `*round` resolves the discarded digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundingMethod {
    Up,
    Down,
    /// Half away from zero.
    Middle,
}

impl RoundingMethod {
    fn parse(s: &str) -> Result<Self, String> {
        match s {
            "*up" => Ok(RoundingMethod::Up),
            "*down" => Ok(RoundingMethod::Down),
            "*middle" => Ok(RoundingMethod::Middle),
            other => Err(format!("unsupported rounding method: <{other}>")),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            RoundingMethod::Up => "*up",
            RoundingMethod::Down => "*down",
            RoundingMethod::Middle => "*middle",
        }
    }
}

/// One compiled converter.
#[derive(Debug, Clone, PartialEq)]
pub enum DataConverter {
    DurationSeconds,
    DurationNanoseconds,
    DurationMinutes,
    Duration,
    Round { decimals: i32, method: RoundingMethod },
    Multiply(f64),
    Divide(f64),
    Len,
    Float64,
    String2Hex,
    Ip2Hex,
}

impl DataConverter {
    /// Parse a converter definition such as `*round:2:*up` or `*multiply:1000`.
    pub fn parse(def: &str) -> Result<Self, String> {
        let (name, args) = match def.split_once(':') {
            Some((name, args)) => (name, Some(args)),
            None => (def, None),
        };
        match (name, args) {
            ("*duration_seconds", None) => Ok(DataConverter::DurationSeconds),
            ("*duration_nanoseconds", None) => Ok(DataConverter::DurationNanoseconds),
            ("*duration_minutes", None) => Ok(DataConverter::DurationMinutes),
            ("*duration", None) => Ok(DataConverter::Duration),
            ("*len", None) => Ok(DataConverter::Len),
            ("*float64", None) => Ok(DataConverter::Float64),
            ("*string2hex", None) => Ok(DataConverter::String2Hex),
            ("*ip2hex", None) => Ok(DataConverter::Ip2Hex),
            ("*round", args) => {
                let mut parts = args.unwrap_or_default().split(':');
                let decimals = match parts.next() {
                    Some("") | None => 0,
                    Some(d) => d
                        .parse::<i32>()
                        .map_err(|e| format!("invalid rounding decimals <{d}>: {e}"))?,
                };
                let method = match parts.next() {
                    Some(m) => RoundingMethod::parse(m)?,
                    None => RoundingMethod::Middle,
                };
                if parts.next().is_some() {
                    return Err(format!("unsupported converter definition: <{def}>"));
                }
                Ok(DataConverter::Round { decimals, method })
            }
            ("*multiply", Some(arg)) => Ok(DataConverter::Multiply(parse_factor(arg)?)),
            ("*divide", Some(arg)) => Ok(DataConverter::Divide(parse_factor(arg)?)),
            _ => Err(format!("unsupported converter definition: <{def}>")),
        }
    }

    /// The converter's definition name, used in error reports.
    pub fn name(&self) -> &'static str {
        match self {
            DataConverter::DurationSeconds => "*duration_seconds",
            DataConverter::DurationNanoseconds => "*duration_nanoseconds",
            DataConverter::DurationMinutes => "*duration_minutes",
            DataConverter::Duration => "*duration",
            DataConverter::Round { .. } => "*round",
            DataConverter::Multiply(_) => "*multiply",
            DataConverter::Divide(_) => "*divide",
            DataConverter::Len => "*len",
            DataConverter::Float64 => "*float64",
            DataConverter::String2Hex => "*string2hex",
            DataConverter::Ip2Hex => "*ip2hex",
        }
    }

    pub fn convert(&self, input: &str) -> Result<String, EvalError> {
        let fail = |reason: String| EvalError::Conversion {
            converter: self.name().to_string(),
            input: input.to_string(),
            reason,
        };
        match self {
            DataConverter::DurationSeconds => {
                let d = duration(input).map_err(fail)?;
                Ok((nanos(d) as f64 / 1e9).to_string())
            }
            DataConverter::DurationNanoseconds => {
                let d = duration(input).map_err(fail)?;
                Ok(nanos(d).to_string())
            }
            DataConverter::DurationMinutes => {
                let d = duration(input).map_err(fail)?;
                Ok((nanos(d) as f64 / 6e10).to_string())
            }
            DataConverter::Duration => {
                let d = duration(input).map_err(fail)?;
                Ok(format_duration(d))
            }
            DataConverter::Round { decimals, method } => {
                let x = float(input).map_err(fail)?;
                let factor = 10f64.powi(*decimals);
                let scaled = x * factor;
                let rounded = match method {
                    RoundingMethod::Up => scaled.ceil(),
                    RoundingMethod::Down => scaled.floor(),
                    RoundingMethod::Middle => scaled.round(),
                };
                Ok((rounded / factor).to_string())
            }
            DataConverter::Multiply(factor) => Ok((float(input).map_err(fail)? * factor).to_string()),
            DataConverter::Divide(factor) => Ok((float(input).map_err(fail)? / factor).to_string()),
            DataConverter::Len => match serde_json::from_str::<serde_json::Value>(input) {
                Ok(serde_json::Value::Array(items)) => Ok(items.len().to_string()),
                _ => Ok(input.chars().count().to_string()),
            },
            DataConverter::Float64 => Ok(float(input).map_err(fail)?.to_string()),
            DataConverter::String2Hex => {
                if input.is_empty() {
                    return Ok(String::new());
                }
                let hex: String = input.bytes().map(|b| format!("{b:02x}")).collect();
                Ok(format!("0x{hex}"))
            }
            DataConverter::Ip2Hex => {
                let ip: Ipv4Addr = input.parse().map_err(|e| fail(format!("{e}")))?;
                Ok(format!("0x{:08x}", u32::from(ip)))
            }
        }
    }

    /// Render back to the textual definition.
    pub fn definition(&self) -> String {
        match self {
            DataConverter::Round { decimals, method } => {
                format!("*round:{decimals}:{}", method.as_str())
            }
            DataConverter::Multiply(f) => format!("*multiply:{f}"),
            DataConverter::Divide(f) => format!("*divide:{f}"),
            other => other.name().to_string(),
        }
    }
}

fn parse_factor(arg: &str) -> Result<f64, String> {
    arg.parse::<f64>()
        .map_err(|e| format!("invalid factor <{arg}>: {e}"))
}

fn duration(input: &str) -> Result<TimeDelta, String> {
    parse_duration_with_nanos(input).map_err(|e| e.to_string())
}

fn nanos(d: TimeDelta) -> i64 {
    d.num_nanoseconds().unwrap_or(i64::MAX)
}

fn float(input: &str) -> Result<f64, String> {
    input
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("cannot parse as number: {e}"))
}
