//! Tolerant amount parsing and invariant formatting.
//!
//! Ledger amounts are free text typed by people in different locales:
//! `"1 200,50"`, `"1200.50"` and `"1200,5"` all mean the same thing. The
//! parser normalizes them and never fails; text that still does not read
//! as a number yields the configured default.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::config::AmountSettings;

/// Parses and formats ledger amounts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmountParser {
    settings: AmountSettings,
}

impl Default for AmountParser {
    fn default() -> Self {
        Self::new(AmountSettings::default())
    }
}

impl AmountParser {
    /// Creates a parser with the given bounds and precision.
    pub fn new(settings: AmountSettings) -> Self {
        Self { settings }
    }

    /// Returns the settings this parser was built with.
    pub fn settings(&self) -> &AmountSettings {
        &self.settings
    }

    /// Parses possibly-absent amount text.
    ///
    /// Whitespace anywhere in the text is dropped, a comma is read as the
    /// decimal point, and the result is parsed culture-invariantly, in
    /// plain or scientific notation.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_ledger::processing::AmountParser;
    /// use rust_decimal::Decimal;
    ///
    /// let parser = AmountParser::default();
    /// assert_eq!(parser.parse(Some("1 200,50")), Decimal::new(120050, 2));
    /// assert_eq!(parser.parse(Some("100.50")), Decimal::new(10050, 2));
    /// assert_eq!(parser.parse(Some("not a number")), Decimal::ZERO);
    /// assert_eq!(parser.parse(None), Decimal::ZERO);
    /// ```
    pub fn parse(&self, text: Option<&str>) -> Decimal {
        let Some(text) = text else {
            return self.settings.default;
        };

        let normalized = normalize(text);
        if normalized.is_empty() {
            return self.settings.default;
        }

        parse_invariant(&normalized).unwrap_or(self.settings.default)
    }

    /// Formats an amount with exactly `decimal_places` fractional digits,
    /// a period as separator and no grouping.
    ///
    /// Midpoints round away from zero and zero never carries a sign.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_ledger::processing::AmountParser;
    /// use rust_decimal::Decimal;
    ///
    /// let parser = AmountParser::default();
    /// assert_eq!(parser.format(Decimal::new(15075, 2)), "150.75");
    /// assert_eq!(parser.format(Decimal::from(1200)), "1200.00");
    /// assert_eq!(parser.format(Decimal::new(1005, 3)), "1.01");
    /// ```
    pub fn format(&self, amount: Decimal) -> String {
        let places = self.settings.decimal_places;
        let mut rounded =
            amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
        if rounded.is_zero() {
            rounded.set_sign_positive(true);
        }
        format!("{:.*}", places as usize, rounded)
    }

    /// Parses every text and returns the sum, or `None` if the sum leaves
    /// the range of `Decimal`.
    pub fn sum<I, S>(&self, texts: I) -> Option<Decimal>
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        checked_sum(
            texts
                .into_iter()
                .map(|text| self.parse(text.as_ref().map(AsRef::as_ref))),
        )
    }

    /// Returns true if `amount` lies within the configured salary range.
    pub fn within_bounds(&self, amount: Decimal) -> bool {
        amount >= self.settings.min && amount <= self.settings.max
    }
}

/// Drops all whitespace and turns commas into periods.
///
/// # Examples
///
/// ```
/// use payroll_ledger::processing::amount::normalize;
///
/// assert_eq!(normalize(" 1\u{a0}200,5 "), "1200.5");
/// ```
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect()
}

/// Adds `amounts`, returning `None` on overflow instead of panicking.
///
/// # Examples
///
/// ```
/// use payroll_ledger::processing::amount::checked_sum;
/// use rust_decimal::Decimal;
///
/// assert_eq!(checked_sum([Decimal::ONE, Decimal::TWO]), Some(Decimal::from(3)));
/// assert_eq!(checked_sum([Decimal::MAX, Decimal::ONE]), None);
/// ```
pub fn checked_sum<I>(amounts: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
}

fn parse_invariant(text: &str) -> Option<Decimal> {
    Decimal::from_str(text).ok().or_else(|| {
        if text.contains(['e', 'E']) {
            Decimal::from_scientific(text).ok()
        } else {
            None
        }
    })
}
