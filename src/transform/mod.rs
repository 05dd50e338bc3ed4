//! Transformation: share parsing, outer merge, row finalization.

pub mod finalize;
pub mod merge;
pub mod share;

pub use finalize::{cherry_asset_id, transform_data};
pub use merge::merge_data;
pub use share::{parse_join, parse_ownership_share};
