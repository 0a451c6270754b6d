pub mod gapfill;
pub mod search;
pub mod stack;

pub use gapfill::{FillCounts, FillOutcome, GapFillTransform, RadiusPolicy};
pub use search::{find_bracket, nearest_valid, DateBracket};
pub use stack::StackProcessor;
