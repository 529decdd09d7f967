//! Reconstruction of amounts split away from their currency marker
//!
//! Shops routinely style prices as `<span>$</span><span>6</span><span>66</span>`,
//! so the marker node holds no digits at all. Starting from an isolated marker,
//! the resolver looks at a fixed set of relatives:
//!
//! - uncle: nearest non-blank sibling of the marker's parent
//! - cousin: first child of the uncle, when it is text
//! - nephew: first child of the marker's nearest non-blank sibling (its brother)
//!
//! A candidate with a single decimal point is a complete amount. Otherwise it
//! is one half of an integer/fraction pair and the next relative one hop
//! further supplies the other half, if it is a bare number.
//!
//! Text the engine already wrote is never read back as a fiat amount.

use log::{debug, trace};

use super::converter::{convert, ConversionResult};
use super::patterns::{MatchKind, PATTERNS};
use crate::context::ScanContext;
use crate::document::{first_text_child, next_sibling, parent, prev_sibling, Document, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Right,
    Left,
}

/// Pending text writes, applied only once every conversion succeeded
type Plan = Vec<(NodeId, String)>;

pub struct AmountResolver<'a> {
    context: &'a ScanContext,
    unit_suffix: &'a str,
}

impl<'a> AmountResolver<'a> {
    pub fn new(context: &'a ScanContext, unit_suffix: &'a str) -> Self {
        AmountResolver {
            context,
            unit_suffix,
        }
    }

    /// Find and rewrite the amount belonging to an isolated `marker`.
    ///
    /// Rightward relatives are searched first when `search_both_sides` is set;
    /// leftward relatives are always the fallback. Returns how many text nodes
    /// changed, zero when nothing could be resolved.
    pub fn resolve(
        &self,
        document: &mut Document,
        marker: NodeId,
        kind: MatchKind,
        search_both_sides: bool,
    ) -> usize {
        let plan = {
            let view: &Document = document;
            let right = if search_both_sides {
                self.plan_right(view, marker)
            } else {
                None
            };
            right.or_else(|| self.plan_left(view, marker, kind))
        };

        match plan {
            Some(plan) => apply(document, plan),
            None => {
                trace!("No amount found around marker {marker:?}");
                0
            }
        }
    }

    fn plan_right(&self, document: &Document, marker: NodeId) -> Option<Plan> {
        let uncle = parent(document, marker).and_then(|p| next_sibling(document, p));

        if let Some(uncle) = uncle {
            if let Some(value) = amount_text(document, uncle) {
                let converted = self.convert_amount(value)?;
                return Some(vec![
                    (uncle, self.with_unit(&converted)),
                    (marker, String::new()),
                ]);
            }
            if let Some(cousin) = first_amount_child(document, uncle) {
                return self.plan_fragments(document, marker, None, cousin, uncle, Direction::Right);
            }
        }

        let brother = next_sibling(document, marker)?;
        let nephew = first_amount_child(document, brother)?;
        self.plan_fragments(document, marker, None, nephew, brother, Direction::Right)
    }

    fn plan_left(&self, document: &Document, marker: NodeId, kind: MatchKind) -> Option<Plan> {
        let marker_text = self.marker_with_unit(document, marker, kind)?;
        let uncle = parent(document, marker).and_then(|p| prev_sibling(document, p));

        if let Some(uncle) = uncle {
            if let Some(value) = amount_text(document, uncle) {
                let converted = self.convert_amount(value)?;
                return Some(vec![(uncle, converted.to_string()), (marker, marker_text)]);
            }
            if let Some(cousin) = first_amount_child(document, uncle) {
                return self.plan_fragments(
                    document,
                    marker,
                    Some(marker_text),
                    cousin,
                    uncle,
                    Direction::Left,
                );
            }
        }

        let brother = prev_sibling(document, marker)?;
        let nephew = first_amount_child(document, brother)?;
        self.plan_fragments(
            document,
            marker,
            Some(marker_text),
            nephew,
            brother,
            Direction::Left,
        )
    }

    /// Plan the rewrite of `fragment` (held by `holder`) and, when it is half of
    /// a split amount, of the second fragment one hop further along `direction`.
    ///
    /// `marker_text` is the marker's new text for leftward resolution; rightward
    /// resolution blanks the marker and puts the unit on the amount instead.
    fn plan_fragments(
        &self,
        document: &Document,
        marker: NodeId,
        marker_text: Option<String>,
        fragment: NodeId,
        holder: NodeId,
        direction: Direction,
    ) -> Option<Plan> {
        let value = document.text(fragment)?;

        let (raw, second) = if has_decimal_point(value) {
            (PATTERNS.find_amount(value)?.to_string(), None)
        } else {
            match second_fragment(document, holder, direction) {
                Some((second, second_value)) => {
                    // The fragment nearer the marker is the integer part when reading
                    // rightward and the fractional part when reading leftward
                    let raw = match direction {
                        Direction::Right => join_fragments(value.trim(), second_value.trim()),
                        Direction::Left => join_fragments(second_value.trim(), value.trim()),
                    };
                    (raw, Some(second))
                }
                None => (PATTERNS.find_amount(value)?.to_string(), None),
            }
        };

        let converted = self.convert_amount(&raw)?;
        debug!("Resolved split amount {raw} to {converted}");

        let mut plan = match direction {
            Direction::Right => vec![
                (fragment, self.with_unit(&converted)),
                (marker, String::new()),
            ],
            Direction::Left => vec![
                (fragment, converted.to_string()),
                (marker, marker_text.unwrap_or_else(|| self.unit_suffix.to_string())),
            ],
        };
        if let Some(second) = second {
            plan.push((second, String::new()));
        }
        Some(plan)
    }

    fn convert_amount(&self, raw: &str) -> Option<ConversionResult> {
        let converted = convert(raw, self.context);
        if converted.is_none() {
            debug!("Could not parse amount {raw:?}");
        }
        converted
    }

    fn with_unit(&self, converted: &ConversionResult) -> String {
        format!("{converted}{}", self.unit_suffix)
    }

    /// Marker text with its currency token swapped for the unit suffix
    fn marker_with_unit(&self, document: &Document, marker: NodeId, kind: MatchKind) -> Option<String> {
        let value = document.text(marker)?;
        let (replaced, count) = PATTERNS
            .marker(kind)
            .replace_all(value, |_| Some(self.unit_suffix.to_string()));
        Some(if count == 0 {
            self.unit_suffix.to_string()
        } else {
            replaced
        })
    }
}

fn apply(document: &mut Document, plan: Plan) -> usize {
    let mut changed = 0;
    for (node, value) in plan {
        if document.text(node) != Some(value.as_str()) && document.rewrite_text(node, &value) {
            changed += 1;
        }
    }
    changed
}

/// Host-provided value of a text node; `None` for engine output
fn host_text(document: &Document, id: NodeId) -> Option<&str> {
    if document.is_engine_written(id) {
        return None;
    }
    document.text(id)
}

/// Value of `id` when it is itself a text node containing an amount
fn amount_text(document: &Document, id: NodeId) -> Option<&str> {
    host_text(document, id).and_then(|value| PATTERNS.find_amount(value))
}

fn first_amount_child(document: &Document, id: NodeId) -> Option<NodeId> {
    first_text_child(document, id)
        .filter(|&child| host_text(document, child).is_some_and(|value| PATTERNS.is_amount(value)))
}

/// The bare-number text child of the relative one hop beyond `holder`
fn second_fragment(document: &Document, holder: NodeId, direction: Direction) -> Option<(NodeId, &str)> {
    let (relative, allow_commas) = match direction {
        Direction::Right => (next_sibling(document, holder)?, false),
        Direction::Left => (prev_sibling(document, holder)?, true),
    };
    let child = first_text_child(document, relative)?;
    let value = host_text(document, child)?;
    is_fragment(value, allow_commas).then_some((child, value))
}

fn has_decimal_point(value: &str) -> bool {
    value.matches('.').count() == 1
}

/// Digits only; integer parts may also carry thousands separators
fn is_fragment(value: &str, allow_commas: bool) -> bool {
    let value = value.trim();
    value.chars().any(|c| c.is_ascii_digit())
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || (allow_commas && c == ','))
}

fn join_fragments(integer: &str, fraction: &str) -> String {
    if fraction.is_empty() {
        integer.to_string()
    } else {
        format!("{integer}.{fraction}")
    }
}
