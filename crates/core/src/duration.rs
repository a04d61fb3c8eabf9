//! Duration strings as they appear on the wire.
//!
//! The configuration format inherits Go's `time.ParseDuration` syntax
//! (`"1m"`, `"1.5h"`, `"300ms"`, `"-2h45m"`) and its canonical rendering
//! (`"1m0s"`). Error texts are matched verbatim by callers, so both the
//! parser and the formatter reproduce that behaviour exactly, including
//! overflow handling and the quoting of offending input.

use chrono::TimeDelta;
use thiserror::Error;

use crate::consts::META_UNLIMITED;

const NANOSECOND: u64 = 1;
const MICROSECOND: u64 = 1_000 * NANOSECOND;
const MILLISECOND: u64 = 1_000 * MICROSECOND;
const SECOND: u64 = 1_000 * MILLISECOND;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;

/// Magnitude limit of a duration in nanoseconds (`1 << 63`).
const LIMIT: u64 = 1 << 63;

/// A duration string that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("time: invalid duration {}", quote(.0))]
    Invalid(String),

    #[error("time: missing unit in duration {}", quote(.0))]
    MissingUnit(String),

    #[error("time: unknown unit {} in duration {}", quote(.unit), quote(.input))]
    UnknownUnit { unit: String, input: String },
}

impl DurationError {
    /// The complete string that failed to parse.
    pub fn input(&self) -> &str {
        match self {
            DurationError::Invalid(input) | DurationError::MissingUnit(input) => input,
            DurationError::UnknownUnit { input, .. } => input,
        }
    }
}

/// Parse a duration string such as `"300ms"`, `"-1.5h"` or `"2h45m"`.
///
/// A duration is an optionally signed sequence of decimal numbers, each
/// with optional fraction and a unit suffix. Valid units are `ns`, `us`
/// (or `µs`), `ms`, `s`, `m` and `h`. The bare string `"0"` is accepted.
pub fn parse_duration(input: &str) -> Result<TimeDelta, DurationError> {
    let invalid = || DurationError::Invalid(input.to_string());

    let mut s = input;
    let mut neg = false;
    if let Some(rest) = s.strip_prefix('-') {
        neg = true;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }
    if s == "0" {
        return Ok(TimeDelta::zero());
    }
    if s.is_empty() {
        return Err(invalid());
    }

    let mut total: u64 = 0;
    while !s.is_empty() {
        // The next character must be [0-9.]
        let first = s.as_bytes()[0];
        if !(first == b'.' || first.is_ascii_digit()) {
            return Err(invalid());
        }

        let before = s.len();
        let (mut value, rest) = leading_int(s).ok_or_else(invalid)?;
        s = rest;
        let has_int = before != s.len();

        let mut fraction = 0u64;
        let mut scale = 1.0f64;
        let mut has_fraction = false;
        if let Some(rest) = s.strip_prefix('.') {
            let before = rest.len();
            let (f, sc, rest) = leading_fraction(rest);
            fraction = f;
            scale = sc;
            s = rest;
            has_fraction = before != s.len();
        }
        if !has_int && !has_fraction {
            // no digits (e.g. ".s" or "-.s")
            return Err(invalid());
        }

        let unit_len = s
            .bytes()
            .position(|c| c == b'.' || c.is_ascii_digit())
            .unwrap_or(s.len());
        if unit_len == 0 {
            return Err(DurationError::MissingUnit(input.to_string()));
        }
        let (unit_str, rest) = s.split_at(unit_len);
        s = rest;
        let unit = unit_nanos(unit_str).ok_or_else(|| DurationError::UnknownUnit {
            unit: unit_str.to_string(),
            input: input.to_string(),
        })?;

        if value > LIMIT / unit {
            return Err(invalid());
        }
        value *= unit;
        if fraction > 0 {
            // float64 is needed to be nanosecond accurate for fractions of hours.
            value += (fraction as f64 * (unit as f64 / scale)) as u64;
            if value > LIMIT {
                return Err(invalid());
            }
        }
        total = total.checked_add(value).ok_or_else(invalid)?;
        if total > LIMIT {
            return Err(invalid());
        }
    }

    if neg {
        return Ok(TimeDelta::nanoseconds((total as i64).wrapping_neg()));
    }
    if total > LIMIT - 1 {
        return Err(invalid());
    }
    Ok(TimeDelta::nanoseconds(total as i64))
}

/// Parse a duration the lenient way configuration values are written:
/// empty means zero, `"-1"` and `"*unlimited"` mean -1ns, a bare integer is
/// a count of nanoseconds, anything else goes through [`parse_duration`].
pub fn parse_duration_with_nanos(input: &str) -> Result<TimeDelta, DurationError> {
    if input == "-1" || input == META_UNLIMITED {
        return Ok(TimeDelta::nanoseconds(-1));
    }
    if input.is_empty() {
        return Ok(TimeDelta::zero());
    }
    if let Ok(nanos) = input.parse::<i64>() {
        return Ok(TimeDelta::nanoseconds(nanos));
    }
    parse_duration(input)
}

/// Render a duration in canonical form: `"72h3m0.5s"`, `"1m0s"`, `"1.5µs"`.
///
/// Leading zero units are omitted. Durations under one second use a
/// smaller unit so the leading digit is non-zero; zero renders as `"0s"`.
pub fn format_duration(d: TimeDelta) -> String {
    let nanos = d.num_nanoseconds().unwrap_or(if d < TimeDelta::zero() {
        i64::MIN
    } else {
        i64::MAX
    });
    let neg = nanos < 0;
    let mut u = nanos.unsigned_abs();

    // Largest value is "-2562047h47m16.854775808s", 25 bytes.
    let mut buf = [0u8; 32];
    let mut w = buf.len();

    if u < SECOND {
        let prec;
        w -= 1;
        buf[w] = b's';
        w -= 1;
        if u == 0 {
            return "0s".to_string();
        } else if u < MICROSECOND {
            prec = 0;
            buf[w] = b'n';
        } else if u < MILLISECOND {
            prec = 3;
            // U+00B5 'µ' micro sign is two bytes
            w -= 1;
            buf[w..w + 2].copy_from_slice("µ".as_bytes());
        } else {
            prec = 6;
            buf[w] = b'm';
        }
        (w, u) = fmt_frac(&mut buf[..w], u, prec);
        w = fmt_int(&mut buf[..w], u);
    } else {
        w -= 1;
        buf[w] = b's';
        (w, u) = fmt_frac(&mut buf[..w], u, 9);
        // u is now whole seconds
        w = fmt_int(&mut buf[..w], u % 60);
        u /= 60;
        if u > 0 {
            w -= 1;
            buf[w] = b'm';
            w = fmt_int(&mut buf[..w], u % 60);
            u /= 60;
            if u > 0 {
                w -= 1;
                buf[w] = b'h';
                w = fmt_int(&mut buf[..w], u);
            }
        }
    }

    if neg {
        w -= 1;
        buf[w] = b'-';
    }
    String::from_utf8_lossy(&buf[w..]).into_owned()
}

fn unit_nanos(unit: &str) -> Option<u64> {
    match unit {
        "ns" => Some(NANOSECOND),
        "us" | "\u{00b5}s" | "\u{03bc}s" => Some(MICROSECOND),
        "ms" => Some(MILLISECOND),
        "s" => Some(SECOND),
        "m" => Some(MINUTE),
        "h" => Some(HOUR),
        _ => None,
    }
}

/// Consume leading decimal digits. `None` on overflow past `1 << 63`.
fn leading_int(s: &str) -> Option<(u64, &str)> {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    let mut x: u64 = 0;
    for c in s[..digits].bytes() {
        if x > LIMIT / 10 {
            return None;
        }
        x = x * 10 + u64::from(c - b'0');
        if x > LIMIT {
            return None;
        }
    }
    Some((x, &s[digits..]))
}

/// Consume the digits after a decimal point. Digits past the precision of
/// a `u64` are consumed but ignored.
fn leading_fraction(s: &str) -> (u64, f64, &str) {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    let mut x: u64 = 0;
    let mut scale = 1.0f64;
    let mut overflow = false;
    for c in s[..digits].bytes() {
        if overflow {
            continue;
        }
        if x > (LIMIT - 1) / 10 {
            overflow = true;
            continue;
        }
        let y = x * 10 + u64::from(c - b'0');
        if y > LIMIT {
            overflow = true;
            continue;
        }
        x = y;
        scale *= 10.0;
    }
    (x, scale, &s[digits..])
}

/// Write the fraction of `v / 10^prec` into the tail of `buf`, omitting
/// trailing zeros and the decimal point when the fraction is zero. Returns
/// the new write index and `v / 10^prec`.
fn fmt_frac(buf: &mut [u8], mut v: u64, prec: usize) -> (usize, u64) {
    let mut w = buf.len();
    let mut print = false;
    for _ in 0..prec {
        let digit = (v % 10) as u8;
        print = print || digit != 0;
        if print {
            w -= 1;
            buf[w] = digit + b'0';
        }
        v /= 10;
    }
    if print {
        w -= 1;
        buf[w] = b'.';
    }
    (w, v)
}

/// Write `v` in decimal into the tail of `buf`, returning the write index.
fn fmt_int(buf: &mut [u8], mut v: u64) -> usize {
    let mut w = buf.len();
    if v == 0 {
        w -= 1;
        buf[w] = b'0';
    } else {
        while v > 0 {
            w -= 1;
            buf[w] = (v % 10) as u8 + b'0';
            v /= 10;
        }
    }
    w
}

/// Quote a string the way Go's time package does in its error messages.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if !c.is_ascii() || c < ' ' {
            let mut bytes = [0u8; 4];
            for b in c.encode_utf8(&mut bytes).bytes() {
                out.push_str(&format!("\\x{b:02x}"));
            }
        } else {
            if c == '"' || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
    }
    out.push('"');
    out
}
