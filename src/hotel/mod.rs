//! Hotel candidate resolution
//!
//! Raw fuzzy-match output goes through match filtering, greedy deduplication
//! and distance-penalized ranking before it is shown for selection.

pub mod dedup;
pub mod matcher;
pub mod rank;
pub mod resolver;

pub use dedup::{DedupThresholds, deduplicate, name_similarity, normalize_name};
pub use matcher::{HotelMatcher, LlmHotelMatcher};
pub use rank::{final_score, rank_candidates};
pub use resolver::{HotelResolver, resolve_hotel_candidates};
