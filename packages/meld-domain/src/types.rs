use serde::{Deserialize, Serialize};

/// One hit from a retrieval source, in that source's native descending order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
	pub id: String,
	pub score: f32,
	pub snippet: String,
}

/// Which retrieval source contributed a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
	Vector,
	Lexical,
}

/// A candidate after Reciprocal Rank Fusion. `fused_score` is the sum of each
/// source's RRF contribution; a source that did not return the id contributes
/// nothing and leaves its rank unset.
#[derive(Debug, Clone, PartialEq)]
pub struct FusedCandidate {
	pub id: String,
	pub fused_score: f32,
	pub vector_rank: Option<u32>,
	pub lexical_rank: Option<u32>,
	pub snippet: String,
}

impl FusedCandidate {
	pub fn sources(&self) -> Vec<Source> {
		let mut sources = Vec::with_capacity(2);

		if self.vector_rank.is_some() {
			sources.push(Source::Vector);
		}
		if self.lexical_rank.is_some() {
			sources.push(Source::Lexical);
		}

		sources
	}

	pub(crate) fn in_both(&self) -> bool {
		self.vector_rank.is_some() && self.lexical_rank.is_some()
	}
}

/// A candidate after the rerank stage. `relevance_score` comes from the
/// pairwise scorer when it ran, and falls back to `fused_score` otherwise;
/// `fused_score` is retained for tie-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
	pub id: String,
	pub relevance_score: f32,
	pub fused_score: f32,
	pub sources: Vec<Source>,
	pub snippet: String,
}

/// One entry of the final list, in MMR selection order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResult {
	pub id: String,
	pub final_score: f32,
	pub sources: Vec<Source>,
	pub snippet: String,
}
