//! Counter text formatting.

/// How a counter value is rendered as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountFormat {
    /// Text placed before the number (e.g. `"$"`).
    pub prefix: String,
    /// Text placed after the number (e.g. `"+"`).
    pub suffix: String,
    /// Fixed number of fractional digits.
    pub decimals: usize,
    /// Thousands separator; `None` disables grouping.
    pub separator: Option<char>,
}

impl CountFormat {
    /// Whole numbers grouped with `,`, no affixes.
    #[must_use]
    pub fn plain() -> Self {
        Self {
            prefix: String::new(),
            suffix: String::new(),
            decimals: 0,
            separator: Some(','),
        }
    }

    /// Set the prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the suffix.
    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Set the number of fractional digits.
    #[must_use]
    pub fn with_decimals(mut self, decimals: usize) -> Self {
        self.decimals = decimals;
        self
    }

    /// Set or clear the thousands separator.
    #[must_use]
    pub fn with_separator(mut self, separator: Option<char>) -> Self {
        self.separator = separator;
        self
    }

    /// Render `value` with this format.
    #[must_use]
    pub fn format(&self, value: f64) -> String {
        let fixed = format!("{:.*}", self.decimals, value.abs());
        let (int_part, frac_part) = match fixed.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (fixed.as_str(), None),
        };

        let grouped = match self.separator {
            Some(sep) => group_digits(int_part, sep),
            None => int_part.to_owned(),
        };

        // "-0" is not a useful counter value
        let negative = value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0');

        let mut out = String::with_capacity(
            self.prefix.len() + grouped.len() + self.suffix.len() + 8,
        );
        if negative {
            out.push('-');
        }
        out.push_str(&self.prefix);
        out.push_str(&grouped);
        if let Some(frac) = frac_part {
            out.push('.');
            out.push_str(frac);
        }
        out.push_str(&self.suffix);
        out
    }
}

impl Default for CountFormat {
    fn default() -> Self {
        Self::plain()
    }
}

fn group_digits(digits: &str, sep: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_is_appended() {
        let fmt = CountFormat::plain().with_suffix("+");
        assert_eq!(fmt.format(300.0), "300+");
    }

    #[test]
    fn thousands_are_grouped() {
        let fmt = CountFormat::plain();
        assert_eq!(fmt.format(1_234_567.0), "1,234,567");
        assert_eq!(fmt.format(999.0), "999");
        assert_eq!(fmt.format(1000.0), "1,000");
    }

    #[test]
    fn decimals_are_fixed() {
        let fmt = CountFormat::plain().with_decimals(2);
        assert_eq!(fmt.format(3.94), "3.94");
        assert_eq!(fmt.format(1234.5), "1,234.50");
    }

    #[test]
    fn prefix_and_suffix() {
        let fmt = CountFormat::plain().with_prefix("$").with_suffix("K");
        assert_eq!(fmt.format(50.0), "$50K");
    }

    #[test]
    fn intermediate_values_round() {
        let fmt = CountFormat::plain();
        assert_eq!(fmt.format(149.6), "150");
    }

    #[test]
    fn grouping_can_be_disabled() {
        let fmt = CountFormat::plain().with_separator(None);
        assert_eq!(fmt.format(12_000.0), "12000");
    }

    #[test]
    fn negative_values_keep_sign() {
        let fmt = CountFormat::plain().with_prefix("$");
        assert_eq!(fmt.format(-1500.0), "-$1,500");
        assert_eq!(fmt.format(-0.2), "$0");
    }
}
