//! Evaluation of performance statistics over many date windows.
//!
//! Windows are resolver queries (trailing lookbacks, explicit ranges) that
//! are resolved, sliced out of the price matrix and evaluated independently,
//! in parallel when there are enough of them. Also provides train /
//! validation / test splits and random train / evaluation sample slices,
//! which turn into windows through [`sample_windows`].

mod builder;
mod engine;
mod types;

pub use builder::{lookback_windows, random_slices, sample_windows, split_fractions};
pub use engine::WindowEvaluator;
pub use types::{SampleSlice, SplitRanges, WindowSpec, WindowStats};
