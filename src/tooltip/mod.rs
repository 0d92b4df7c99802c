//! Nearest-series tooltip resolution.
//!
//! Every series finds its own nearest point to the pointer and reports it to
//! a shared [`arbiter::TooltipArbiter`]. A short moment later each series
//! checks whether its point is the globally nearest one for the same pointer
//! move, and only that series shows its tooltip.

pub mod anchor;
pub mod arbiter;

pub use anchor::TooltipAnchor;
pub use arbiter::{Arbitration, NearestCandidate, PointerSample, SeriesId, TooltipArbiter};
