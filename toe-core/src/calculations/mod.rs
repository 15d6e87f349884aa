//! The correction pipeline, in calling order: group periods into
//! segments, select the lookback window, convert eligibility under the
//! legal rule, re-expand to display rows, and derive the wage base.

pub mod common;
pub mod conversion;
pub mod distribution;
pub mod segments;
pub mod wage_base;
pub mod window;

pub use conversion::{ConvertedSegment, ToeConversionResult, ToeConverter};
pub use distribution::{PeriodToeRow, distribute_corrected_toe};
pub use segments::{RowSplit, SegmentBuilder, split_rows};
pub use wage_base::{SubsidyCorrection, WageBaseCalculator, WageBaseResult};
pub use window::{ToeWindowSelection, select_toe_period};
