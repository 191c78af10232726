use std::{cmp::Ordering, fmt, future::Future, time::Duration};

use tracing::{debug, warn};
use uuid::Uuid;

use meld_domain::{FinalResult, FusedCandidate, RankedCandidate, SearchHit, diversity, fusion};

use crate::{Error, RankingPipeline, Result};

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct RankRequest {
	pub query: String,
	pub top_k: u32,
}

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct RankResponse {
	pub trace_id: Uuid,
	pub results: Vec<FinalResult>,
	pub diagnostics: Diagnostics,
}

/// Which stages actually ran for a query. A degraded stage flips its flag to
/// `false` and the response stays a success; only losing both retrieval
/// sources is fatal.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Diagnostics {
	pub used_vector: bool,
	pub used_lexical: bool,
	pub reranked: bool,
	pub diversity_applied: bool,
}

enum SourceFailure {
	Timeout { budget_ms: u64 },
	Unavailable { message: String },
}

impl fmt::Display for SourceFailure {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Timeout { budget_ms } => write!(f, "timed out after {budget_ms} ms"),
			Self::Unavailable { message } => write!(f, "{message}"),
		}
	}
}

impl RankingPipeline {
	/// Run the full ranking flow for one query: concurrent vector and lexical
	/// retrieval, RRF fusion, bounded rerank, then MMR selection of the final
	/// `top_k`.
	pub async fn rank(&self, req: RankRequest) -> Result<RankResponse> {
		let query = req.query.trim();

		if query.is_empty() {
			return Err(Error::InvalidRequest { message: "query must be non-empty.".into() });
		}
		if req.top_k == 0 {
			return Err(Error::InvalidRequest { message: "top_k must be greater than zero.".into() });
		}

		let trace_id = Uuid::new_v4();
		let depth = self.cfg.retrieval.depth;
		let vector_cfg = &self.cfg.providers.vector;
		let lexical_cfg = &self.cfg.providers.lexical;
		let (vector, lexical) = tokio::join!(
			timed(vector_cfg.timeout_ms, self.providers.vector.search(vector_cfg, query, depth)),
			timed(lexical_cfg.timeout_ms, self.providers.lexical.search(lexical_cfg, query, depth)),
		);
		let mut diagnostics = Diagnostics::default();
		let vector_hits = take_side(trace_id, "vector", vector, &mut diagnostics.used_vector);
		let lexical_hits = take_side(trace_id, "lexical", lexical, &mut diagnostics.used_lexical);

		if !diagnostics.used_vector && !diagnostics.used_lexical {
			return Err(Error::NoCandidates);
		}

		let mut fused = fusion::fuse(&vector_hits, &lexical_hits, self.cfg.fusion.rrf_k);

		fused.truncate(self.cfg.rerank.rerank_k as usize);
		debug!(trace_id = %trace_id, candidates = fused.len(), "Fused retrieval candidates.");

		let (ranked, reranked) = self.rerank_stage(trace_id, query, fused).await;

		diagnostics.reranked = reranked;

		let selected =
			diversity::mmr_select(&ranked, req.top_k as usize, self.cfg.diversity.mmr_lambda);

		diagnostics.diversity_applied = !selected.is_empty();

		let results = selected
			.into_iter()
			.map(|candidate| FinalResult {
				id: candidate.id,
				final_score: candidate.relevance_score,
				sources: candidate.sources,
				snippet: candidate.snippet,
			})
			.collect();

		Ok(RankResponse { trace_id, results, diagnostics })
	}

	/// Score the fused candidates with the rerank provider. Any failure,
	/// timeout, or score-count mismatch falls back to the fused ordering with
	/// fused scores as relevance.
	async fn rerank_stage(
		&self,
		trace_id: Uuid,
		query: &str,
		fused: Vec<FusedCandidate>,
	) -> (Vec<RankedCandidate>, bool) {
		if fused.is_empty() {
			return (Vec::new(), false);
		}

		let docs = fused.iter().map(|candidate| candidate.snippet.clone()).collect::<Vec<_>>();
		let cfg = &self.cfg.providers.rerank;
		let scores = match timed(cfg.timeout_ms, self.providers.rerank.rerank(cfg, query, &docs))
			.await
		{
			Ok(scores) if scores.len() == docs.len() => Some(scores),
			Ok(scores) => {
				warn!(
					trace_id = %trace_id,
					expected = docs.len(),
					received = scores.len(),
					"Rerank returned a mismatched score count; keeping fused order.",
				);

				None
			},
			Err(failure) => {
				warn!(
					trace_id = %trace_id,
					error = %failure,
					"Rerank degraded; keeping fused order.",
				);

				None
			},
		};
		let reranked = scores.is_some();
		let mut ranked = fused
			.into_iter()
			.enumerate()
			.map(|(index, candidate)| {
				let relevance_score = match &scores {
					Some(scores) => scores[index],
					None => candidate.fused_score,
				};
				let sources = candidate.sources();

				RankedCandidate {
					id: candidate.id,
					relevance_score,
					fused_score: candidate.fused_score,
					sources,
					snippet: candidate.snippet,
				}
			})
			.collect::<Vec<_>>();

		if reranked {
			// Stable sort keeps fused order for candidates the scorer ties.
			ranked.sort_by(|a, b| {
				b.relevance_score
					.partial_cmp(&a.relevance_score)
					.unwrap_or(Ordering::Equal)
					.then_with(|| {
						b.fused_score.partial_cmp(&a.fused_score).unwrap_or(Ordering::Equal)
					})
			});
		}

		(ranked, reranked)
	}
}

async fn timed<T>(
	budget_ms: u64,
	fut: impl Future<Output = color_eyre::Result<T>>,
) -> std::result::Result<T, SourceFailure> {
	match tokio::time::timeout(Duration::from_millis(budget_ms), fut).await {
		Ok(Ok(value)) => Ok(value),
		Ok(Err(error)) => Err(SourceFailure::Unavailable { message: error.to_string() }),
		Err(_) => Err(SourceFailure::Timeout { budget_ms }),
	}
}

fn take_side(
	trace_id: Uuid,
	source: &'static str,
	outcome: std::result::Result<Vec<SearchHit>, SourceFailure>,
	used: &mut bool,
) -> Vec<SearchHit> {
	match outcome {
		Ok(hits) => {
			*used = true;

			hits
		},
		Err(failure) => {
			warn!(
				trace_id = %trace_id,
				source,
				error = %failure,
				"Retrieval source degraded; continuing without it.",
			);

			Vec::new()
		},
	}
}
