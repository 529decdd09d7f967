//! Tree scanning and in-node price rewriting

use log::{debug, trace};
use std::ops::AddAssign;

use super::converter::convert;
use super::patterns::{MatchKind, PricePattern, PATTERNS};
use super::resolver::AmountResolver;
use crate::context::ScanContext;
use crate::document::{Document, NodeId, TextWalker};

/// Containers whose text is never rewritten
pub const DEFAULT_EXCLUDED_TAGS: [&str; 10] = [
    "html", "head", "script", "noscript", "style", "img", "textarea", "input", "audio", "video",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Eligible text nodes visited
    pub text_nodes: usize,
    /// Text nodes whose value changed
    pub rewritten: usize,
}

impl AddAssign for ScanStats {
    fn add_assign(&mut self, other: Self) {
        self.text_nodes += other.text_nodes;
        self.rewritten += other.rewritten;
    }
}

pub struct TreeScanner<'a> {
    context: &'a ScanContext,
    excluded_tags: &'a [String],
    unit_suffix: &'a str,
}

impl<'a> TreeScanner<'a> {
    pub fn new(context: &'a ScanContext, excluded_tags: &'a [String], unit_suffix: &'a str) -> Self {
        TreeScanner {
            context,
            excluded_tags,
            unit_suffix,
        }
    }

    /// Rewrite every recognizable price in the text below `root`
    pub fn scan(&self, document: &mut Document, root: NodeId) -> ScanStats {
        let mut walker = TextWalker::new(root, self.excluded_tags);
        let mut stats = ScanStats::default();

        while let Some(node) = walker.next_node(document) {
            stats.text_nodes += 1;
            stats.rewritten += self.scan_text(document, node);
        }

        trace!(
            "Scanned {} text nodes under {root:?}, rewrote {}",
            stats.text_nodes,
            stats.rewritten
        );
        stats
    }

    /// Classify one text node and act on the first category that applies
    fn scan_text(&self, document: &mut Document, node: NodeId) -> usize {
        let Some(value) = document.text(node).map(str::to_string) else {
            return 0;
        };

        if PATTERNS.joined.is_match(&value) {
            return self.convert_in_place(document, node, &value, &PATTERNS.joined);
        }

        if PATTERNS.short_currency.is_match(&value) {
            if PATTERNS.short_amount_left.is_match(&value) {
                return self.convert_in_place(document, node, &value, &PATTERNS.short_amount_left);
            }
            if PATTERNS.short_amount_right.is_match(&value) {
                return self.convert_in_place(document, node, &value, &PATTERNS.short_amount_right);
            }
            if PATTERNS.is_isolated_short(&value) {
                return self.resolver().resolve(document, node, MatchKind::CurrencyOnly, true);
            }
            return 0;
        }

        if PATTERNS.long_currency.is_match(&value) {
            if PATTERNS.long_amount_left.is_match(&value) {
                return self.convert_in_place(document, node, &value, &PATTERNS.long_amount_left);
            }
            // Long-form names are not expected before the amount
            if PATTERNS.is_isolated_long(&value) {
                return self.resolver().resolve(document, node, MatchKind::LongForm, false);
            }
        }

        0
    }

    fn convert_in_place(
        &self,
        document: &mut Document,
        node: NodeId,
        value: &str,
        pattern: &PricePattern,
    ) -> usize {
        let (rewritten, count) = pattern.replace_all(value, |found| {
            convert(found.numeric_span, self.context)
                .map(|converted| format!("{converted}{}", self.unit_suffix))
        });

        if count == 0 || rewritten == value {
            return 0;
        }
        debug!("Converted {count} price(s) in {value:?}");
        usize::from(document.rewrite_text(node, &rewritten))
    }

    fn resolver(&self) -> AmountResolver<'a> {
        AmountResolver::new(self.context, self.unit_suffix)
    }
}
