//! Maximal Marginal Relevance selection over the reranked slice.

use std::collections::HashSet;

use crate::RankedCandidate;

/// Snippets are capped to their first 50 whitespace tokens before similarity
/// comparison. The cap is fixed so diversity outcomes stay consistent across
/// deployments; changing it changes which near-duplicates survive selection.
pub const SNIPPET_TOKEN_CAP: usize = 50;

/// Token-set Jaccard coefficient over case-normalized, whitespace-tokenized
/// text, 0.0 when either side has no tokens.
pub fn token_jaccard(a: &str, b: &str) -> f32 {
	jaccard(&token_set(a), &token_set(b))
}

/// Select up to `top_k` candidates balancing relevance against similarity to
/// what is already selected: `mmr = lambda * relevance - (1 - lambda) *
/// max_similarity`. The first pick is the single most relevant candidate and
/// takes no penalty. Ties break by higher relevance, then by input order. The
/// returned order is the presentation order.
pub fn mmr_select(candidates: &[RankedCandidate], top_k: usize, lambda: f32) -> Vec<RankedCandidate> {
	if top_k == 0 || candidates.is_empty() {
		return Vec::new();
	}

	let tokens: Vec<HashSet<String>> = candidates.iter().map(|c| token_set(&c.snippet)).collect();
	let mut remaining: Vec<usize> = (0..candidates.len()).collect();
	let mut selected: Vec<usize> = Vec::with_capacity(top_k.min(candidates.len()));

	while selected.len() < top_k && !remaining.is_empty() {
		let mut best_pos = 0;
		let mut best_score = mmr_score(candidates, &tokens, &selected, remaining[0], lambda);

		for (pos, &idx) in remaining.iter().enumerate().skip(1) {
			let score = mmr_score(candidates, &tokens, &selected, idx, lambda);
			// Strict comparisons keep the earlier input position on full ties.
			let better = score > best_score
				|| (score == best_score
					&& candidates[idx].relevance_score
						> candidates[remaining[best_pos]].relevance_score);

			if better {
				best_pos = pos;
				best_score = score;
			}
		}

		selected.push(remaining.remove(best_pos));
	}

	selected.into_iter().map(|idx| candidates[idx].clone()).collect()
}

fn mmr_score(
	candidates: &[RankedCandidate],
	tokens: &[HashSet<String>],
	selected: &[usize],
	idx: usize,
	lambda: f32,
) -> f32 {
	let similarity = selected
		.iter()
		.map(|&chosen| jaccard(&tokens[idx], &tokens[chosen]))
		.fold(0.0f32, f32::max);

	lambda * candidates[idx].relevance_score - (1.0 - lambda) * similarity
}

fn token_set(text: &str) -> HashSet<String> {
	text.split_whitespace().take(SNIPPET_TOKEN_CAP).map(str::to_lowercase).collect()
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
	if a.is_empty() || b.is_empty() {
		return 0.0;
	}

	let intersection = a.intersection(b).count();
	let union = a.len() + b.len() - intersection;

	intersection as f32 / union as f32
}
