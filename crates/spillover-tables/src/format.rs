//! Number formatting for rendered tables.

use serde::{Deserialize, Serialize};

/// How numbers appear in rendered tables.
///
/// The default prints two decimals with a comma thousands separator and an
/// empty cell for missing values, e.g. `1,234.57`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayFormat {
    /// Digits after the decimal point.
    #[serde(default = "default_precision")]
    pub precision: usize,
    /// Separator between groups of three integer digits, if any.
    #[serde(default = "default_separator")]
    pub thousands_separator: Option<char>,
    /// Text printed for missing (`NaN`) values.
    #[serde(default)]
    pub missing: String,
}

const fn default_precision() -> usize {
    2
}

#[allow(clippy::unnecessary_wraps)]
const fn default_separator() -> Option<char> {
    Some(',')
}

impl Default for DisplayFormat {
    fn default() -> Self {
        Self {
            precision: default_precision(),
            thousands_separator: default_separator(),
            missing: String::new(),
        }
    }
}

impl DisplayFormat {
    /// Format one value.
    pub fn format_value(&self, value: f64) -> String {
        if value.is_nan() {
            return self.missing.clone();
        }
        if value.is_infinite() {
            return if value > 0.0 { "inf" } else { "-inf" }.to_owned();
        }
        let digits = format!("{:.*}", self.precision, value.abs());
        let (integer, fraction) = digits
            .split_once('.')
            .map_or((digits.as_str(), None), |(i, f)| (i, Some(f)));

        let mut out = String::with_capacity(digits.len().saturating_mul(2));
        if value < 0.0 {
            out.push('-');
        }
        let len = integer.len();
        for (i, ch) in integer.chars().enumerate() {
            let boundary = i > 0 && len.saturating_sub(i) % 3 == 0;
            if let Some(sep) = self.thousands_separator.filter(|_| boundary) {
                out.push(sep);
            }
            out.push(ch);
        }
        if let Some(fraction) = fraction {
            out.push('.');
            out.push_str(fraction);
        }
        out
    }
}
