//! Small statistics helpers used by the tuner.
//!
//! - [`accumulator`]: Running count, sum and sum of squares for streamed samples
//! - [`descriptive`]: Descriptive statistics for a finished dataset
//!
//! # Examples
//!
//! ## Accumulating samples
//!
//! ```
//! use reversi_stats::accumulator::Accumulator;
//!
//! let acc = [1.0, 2.0, 3.0].into_iter().collect::<Accumulator>();
//! assert_eq!(acc.avg(), 2.0);
//! ```
//!
//! ## Summarizing a dataset
//!
//! ```
//! use reversi_stats::descriptive::DescriptiveStats;
//!
//! let stats = DescriptiveStats::new([4.0, 1.0, 3.0, 2.0, 5.0]).unwrap();
//! assert_eq!(stats.median, 3.0);
//! ```

pub mod accumulator;
pub mod descriptive;
