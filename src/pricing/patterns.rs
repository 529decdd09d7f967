//! Amount and currency recognition
//!
//! The `regex` crate has no lookaround, so the boundary guards around a price
//! are consumed guard groups and the price itself is the named `price` group.
//! Matching always restarts at the end of the previous `price` span, which
//! keeps a guard character available to the next price.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::ops::Range;

/// Optionally negative decimal with comma-grouped digits
pub const AMOUNT: &str = r"-?[0-9]+(?:\.[0-9]+)?(?:,[0-9]+(?:\.[0-9]+)?)*";
pub const SHORT_CURRENCY: &str = r"(?:USD|U\.S\.D\.|US\s?\$|U\.S\.\s?\$|\$)";
pub const LONG_CURRENCY: &str = r"(?:U\.?S\.?\s*)?Dollars?";

// Neither side of a price may touch a letter, a digit or another `$`
const GUARD_BEFORE: &str = r"(?:^|[^a-z0-9$])";
const GUARD_AFTER: &str = r"(?:[^a-z0-9$]|$)";

pub static PATTERNS: Lazy<PatternLibrary> =
    Lazy::new(|| PatternLibrary::build().expect("built-in price patterns are valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Amount and short marker with no whitespace between them
    Joined,
    /// Short marker (`$`, `USD`, `US$`...) with the amount separated or elsewhere
    CurrencyOnly,
    /// `Dollar`/`Dollars`, optionally prefixed by `US`/`U.S.`
    LongForm,
}

/// One recognized price inside a text value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountMatch<'t> {
    pub range: Range<usize>,
    pub matched_text: &'t str,
    /// Empty when the pattern recognizes a marker only
    pub numeric_span: &'t str,
    pub kind: MatchKind,
}

#[derive(Debug)]
pub struct PricePattern {
    regex: Regex,
    kind: MatchKind,
}

impl PricePattern {
    fn new(pattern: &str, kind: MatchKind) -> Result<Self, regex::Error> {
        Ok(PricePattern {
            regex: Regex::new(&format!("(?i){pattern}"))?,
            kind,
        })
    }

    pub fn kind(&self) -> MatchKind {
        self.kind
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.find_iter(text).next().is_some()
    }

    /// Every non-overlapping price in `text`, left to right
    pub fn find_iter<'p, 't>(&'p self, text: &'t str) -> Matches<'p, 't> {
        Matches {
            pattern: self,
            text,
            at: 0,
        }
    }

    /// Rebuild `text` with each price replaced by `replace`'s output.
    ///
    /// A `None` from `replace` keeps that price as it was. Returns the new text
    /// and how many prices were replaced.
    pub fn replace_all<F>(&self, text: &str, mut replace: F) -> (String, usize)
    where
        F: FnMut(&AmountMatch<'_>) -> Option<String>,
    {
        let mut output = String::with_capacity(text.len());
        let mut last = 0;
        let mut replaced = 0;

        for found in self.find_iter(text) {
            if let Some(replacement) = replace(&found) {
                output.push_str(&text[last..found.range.start]);
                output.push_str(&replacement);
                last = found.range.end;
                replaced += 1;
            }
        }
        output.push_str(&text[last..]);

        (output, replaced)
    }
}

pub struct Matches<'p, 't> {
    pattern: &'p PricePattern,
    text: &'t str,
    at: usize,
}

impl<'t> Iterator for Matches<'_, 't> {
    type Item = AmountMatch<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.at > self.text.len() {
            return None;
        }
        let captures = self.pattern.regex.captures_at(self.text, self.at)?;
        let price = first_group(&captures, &["price", "price_r"])?;
        let numeric_span = first_group(&captures, &["amount", "amount_r"])
            .map(|amount| amount.as_str())
            .unwrap_or_default();

        self.at = if price.end() > price.start() {
            price.end()
        } else {
            price.end() + 1
        };

        Some(AmountMatch {
            range: price.range(),
            matched_text: price.as_str(),
            numeric_span,
            kind: self.pattern.kind,
        })
    }
}

fn first_group<'t>(captures: &Captures<'t>, names: &[&str]) -> Option<regex::Match<'t>> {
    names.iter().find_map(|name| captures.name(name))
}

/// The compiled pattern set used by the scanner and the resolver
#[derive(Debug)]
pub struct PatternLibrary {
    /// Amount glued to a short marker, either order: `11.1USD`, `$22`
    pub joined: PricePattern,
    /// A short marker on its own
    pub short_currency: PricePattern,
    /// A long-form marker on its own
    pub long_currency: PricePattern,
    /// `5.55 $`
    pub short_amount_left: PricePattern,
    /// `USD 66`
    pub short_amount_right: PricePattern,
    /// `7.77 Dollars`
    pub long_amount_left: PricePattern,
    amount: Regex,
    short_isolated: Regex,
    long_isolated: Regex,
}

impl PatternLibrary {
    pub fn build() -> Result<Self, regex::Error> {
        let joined = format!(
            "{GUARD_BEFORE}(?P<price>(?P<amount>{AMOUNT}){SHORT_CURRENCY}){GUARD_AFTER}\
             |{GUARD_BEFORE}(?P<price_r>{SHORT_CURRENCY}(?P<amount_r>{AMOUNT})){GUARD_AFTER}"
        );

        Ok(PatternLibrary {
            joined: PricePattern::new(&joined, MatchKind::Joined)?,
            short_currency: PricePattern::new(
                &format!("{GUARD_BEFORE}(?P<price>{SHORT_CURRENCY}){GUARD_AFTER}"),
                MatchKind::CurrencyOnly,
            )?,
            long_currency: PricePattern::new(
                &format!(r"(?:^|\s)(?P<price>{LONG_CURRENCY})\b"),
                MatchKind::LongForm,
            )?,
            short_amount_left: PricePattern::new(
                &format!(r"(?P<price>(?P<amount>{AMOUNT})\s+{SHORT_CURRENCY}){GUARD_AFTER}"),
                MatchKind::CurrencyOnly,
            )?,
            short_amount_right: PricePattern::new(
                &format!(r"{GUARD_BEFORE}(?P<price>{SHORT_CURRENCY}\s+(?P<amount>{AMOUNT}))"),
                MatchKind::CurrencyOnly,
            )?,
            long_amount_left: PricePattern::new(
                &format!(r"(?P<price>(?P<amount>{AMOUNT})\s+{LONG_CURRENCY})\b"),
                MatchKind::LongForm,
            )?,
            amount: Regex::new(AMOUNT)?,
            short_isolated: Regex::new(&format!("(?i)^{SHORT_CURRENCY}$"))?,
            long_isolated: Regex::new(&format!("(?i)^{LONG_CURRENCY}$"))?,
        })
    }

    /// First amount anywhere in `text`
    pub fn find_amount<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.amount.find(text).map(|found| found.as_str())
    }

    pub fn is_amount(&self, text: &str) -> bool {
        self.amount.is_match(text)
    }

    /// Whether the trimmed text is nothing but a short marker
    pub fn is_isolated_short(&self, text: &str) -> bool {
        self.short_isolated.is_match(text.trim())
    }

    /// Whether the trimmed text is nothing but a long-form marker
    pub fn is_isolated_long(&self, text: &str) -> bool {
        self.long_isolated.is_match(text.trim())
    }

    /// The marker pattern used to locate the currency token inside an isolated marker node
    pub fn marker(&self, kind: MatchKind) -> &PricePattern {
        match kind {
            MatchKind::LongForm => &self.long_currency,
            MatchKind::Joined | MatchKind::CurrencyOnly => &self.short_currency,
        }
    }
}
