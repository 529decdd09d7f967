//! Price detection and in-place rewriting
//!
//! The scanner walks text nodes and classifies each against the pattern
//! library. Prices found inside a single node are converted directly; a lone
//! currency marker is handed to the resolver, which reassembles the amount
//! from neighbouring nodes.

pub mod converter;
pub mod patterns;
pub mod resolver;
pub mod scanner;

pub use converter::{convert, parse_amount, ConversionResult};
pub use patterns::{AmountMatch, MatchKind, PatternLibrary, PricePattern, PATTERNS};
pub use resolver::AmountResolver;
pub use scanner::{ScanStats, TreeScanner, DEFAULT_EXCLUDED_TAGS};
