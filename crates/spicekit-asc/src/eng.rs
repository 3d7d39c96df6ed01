//! Engineering-notation formatting for component and parameter values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// SI prefixes for the negative exponent groups, from 10^-15 to 10^-3.
const SMALL_SUFFIXES: [&str; 5] = ["f", "p", "n", "u", "m"];

/// Format a number with SPICE engineering suffixes.
///
/// `11000.0` becomes `11k`, `1.1e-6` becomes `1.1u`, `2.2e6` becomes
/// `2.2Meg`. Values outside the f..t range fall back to scientific notation.
pub fn format_eng(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return format_g(value);
    }
    let e = (value.abs().log10() / 3.0).floor() as i32;
    let suffix = match e {
        -5..=-1 => SMALL_SUFFIXES[(e + 5) as usize],
        0 => return format_g(value),
        1 => "k",
        2 => "Meg",
        3 => "g",
        4 => "t",
        _ => return format_sci(value),
    };
    format!("{}{suffix}", format_g(value * 1000f64.powi(-e)))
}

/// C-style `%g`: six significant digits, trailing zeros removed.
fn format_g(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }
    let exp = value.abs().log10().floor() as i32;
    if !(-4..6).contains(&exp) {
        return trim_sci(&format!("{value:.5e}"));
    }
    let decimals = (5 - exp).max(0) as usize;
    trim_zeros(&format!("{value:.decimals$}")).to_string()
}

/// C-style `%E`: `1.000000E+15`.
fn format_sci(value: f64) -> String {
    let raw = format!("{value:.6E}");
    match raw.split_once('E') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}E{sign}{:02}", exp.abs())
        }
        None => raw,
    }
}

/// `%g` in exponent form: trimmed mantissa and a signed two-digit exponent.
fn trim_sci(raw: &str) -> String {
    match raw.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{sign}{:02}", trim_zeros(mantissa), exp.abs())
        }
        None => raw.to_string(),
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// A value to store in a component or parameter: either text written
/// verbatim or a number rendered with [`format_eng`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpiceValue {
    Number(f64),
    Text(String),
}

impl SpiceValue {
    pub fn render(&self) -> String {
        match self {
            SpiceValue::Number(n) => format_eng(*n),
            SpiceValue::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for SpiceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<&str> for SpiceValue {
    fn from(s: &str) -> Self {
        SpiceValue::Text(s.to_string())
    }
}

impl From<String> for SpiceValue {
    fn from(s: String) -> Self {
        SpiceValue::Text(s)
    }
}

impl From<&String> for SpiceValue {
    fn from(s: &String) -> Self {
        SpiceValue::Text(s.clone())
    }
}

macro_rules! numeric_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for SpiceValue {
                fn from(n: $t) -> Self {
                    SpiceValue::Number(n as f64)
                }
            }
        )*
    };
}

numeric_value!(f64, f32, i32, i64, u32, u64, usize);
