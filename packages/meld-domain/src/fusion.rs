//! Reciprocal Rank Fusion over two independently ranked hit lists.

use std::{cmp::Ordering, collections::HashMap};

use crate::{FusedCandidate, SearchHit, Source};

/// Merge a vector-ranked and a lexical-ranked hit list into one fused ranking.
///
/// Each source contributes `1 / (rrf_k + rank)` at 1-based rank; an id absent
/// from a source contributes nothing from it. The output is the union of both
/// id sets, sorted descending by fused score with a deterministic tie-break:
/// present in both sources first, then better vector rank, then lexicographic
/// id. A duplicate id within one source list keeps its first (best-ranked)
/// occurrence.
pub fn fuse(vector: &[SearchHit], lexical: &[SearchHit], rrf_k: u32) -> Vec<FusedCandidate> {
	let mut merged: HashMap<String, FusedCandidate> = HashMap::new();

	accumulate(&mut merged, vector, Source::Vector, rrf_k);
	accumulate(&mut merged, lexical, Source::Lexical, rrf_k);

	let mut results: Vec<FusedCandidate> = merged.into_values().collect();

	results.sort_by(compare_fused);

	results
}

fn accumulate(
	merged: &mut HashMap<String, FusedCandidate>,
	hits: &[SearchHit],
	source: Source,
	rrf_k: u32,
) {
	for (idx, hit) in hits.iter().enumerate() {
		let rank = idx as u32 + 1;
		let entry = merged.entry(hit.id.clone()).or_insert_with(|| FusedCandidate {
			id: hit.id.clone(),
			fused_score: 0.0,
			vector_rank: None,
			lexical_rank: None,
			snippet: hit.snippet.clone(),
		});
		let slot = match source {
			Source::Vector => &mut entry.vector_rank,
			Source::Lexical => &mut entry.lexical_rank,
		};

		if slot.is_some() {
			continue;
		}

		*slot = Some(rank);
		entry.fused_score += rrf_contribution(rrf_k, rank);

		if entry.snippet.is_empty() && !hit.snippet.is_empty() {
			entry.snippet = hit.snippet.clone();
		}
	}
}

/// A single source's contribution at 1-based `rank`: `1 / (rrf_k + rank)`.
pub fn rrf_contribution(rrf_k: u32, rank: u32) -> f32 {
	1.0 / (rrf_k as f32 + rank as f32)
}

fn compare_fused(a: &FusedCandidate, b: &FusedCandidate) -> Ordering {
	b.fused_score
		.partial_cmp(&a.fused_score)
		.unwrap_or(Ordering::Equal)
		.then_with(|| b.in_both().cmp(&a.in_both()))
		.then_with(|| compare_vector_rank(a.vector_rank, b.vector_rank))
		.then_with(|| a.id.cmp(&b.id))
}

// Lower vector rank wins; an absent vector rank sorts last.
fn compare_vector_rank(a: Option<u32>, b: Option<u32>) -> Ordering {
	match (a, b) {
		(Some(a), Some(b)) => a.cmp(&b),
		(Some(_), None) => Ordering::Less,
		(None, Some(_)) => Ordering::Greater,
		(None, None) => Ordering::Equal,
	}
}
