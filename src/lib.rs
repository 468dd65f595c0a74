//! Optimal paragraph line breaking for justified typesetting.
//!
//! `totalfit` implements the Knuth-Plass total-fit algorithm: a paragraph is
//! tokenized into boxes (glyph runs), glue (flexible whitespace), and
//! penalties (discretionary break costs), then a dynamic program over an
//! active frontier of candidate breaks picks the chain of breakpoints that
//! minimizes accumulated demerits across the whole paragraph.
//!
//! Width measurement and syllabification are injected through the
//! [`TextMeasurer`] and [`Hyphenator`] oracles; rendering the resulting
//! lines is the caller's business.
//!
//! ```
//! use std::sync::Arc;
//! use totalfit::{BreakerConfig, HeuristicMeasurer, ParagraphBreaker, ParagraphTokenizer};
//!
//! let measurer = Arc::new(HeuristicMeasurer::new(16.0));
//! let stream = ParagraphTokenizer::new(measurer)
//!     .tokenize("the quick brown fox jumps over the lazy dog")?;
//!
//! let breaker = ParagraphBreaker::new(BreakerConfig::for_width(160.0));
//! for line in breaker.lines(&stream)? {
//!     assert!(line.breakpoint.ratio >= -1.0);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![cfg_attr(
    not(test),
    deny(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

mod breaker;
mod error;
mod item;
mod measure;
mod tokenize;

pub use breaker::{BreakSummary, Breakpoint, BreakerConfig, Line, ParagraphBreaker};
pub use error::{BreakError, TokenizeError};
pub use item::{has_terminator, Item};
pub use measure::{HeuristicMeasurer, Hyphenator, MonospaceMeasurer, NoHyphenation, TextMeasurer};
pub use tokenize::{ParagraphOptions, ParagraphTokenizer};
