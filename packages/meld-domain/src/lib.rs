pub mod diversity;
pub mod fusion;
mod types;

pub use types::{FinalResult, FusedCandidate, RankedCandidate, SearchHit, Source};
