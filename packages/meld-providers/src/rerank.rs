use color_eyre::{Result, eyre};
use serde_json::Value;

/// Score one query against a batch of documents in a single call. Scores come
/// back index-aligned with `docs`; a document the scorer skipped keeps 0.0.
pub async fn rerank(
	cfg: &meld_config::ProviderConfig,
	query: &str,
	docs: &[String],
) -> Result<Vec<f32>> {
	let body = serde_json::json!({ "model": cfg.model, "query": query, "documents": docs });
	let res = crate::client(cfg)?
		.post(crate::endpoint(cfg))
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	score_batch(&json, docs.len())
}

fn score_batch(json: &Value, batch_len: usize) -> Result<Vec<f32>> {
	let entries = json
		.get("results")
		.or_else(|| json.get("data"))
		.and_then(Value::as_array)
		.ok_or_else(|| eyre::eyre!("Rerank response has no results array."))?;
	let mut scores = vec![0.0_f32; batch_len];

	for entry in entries {
		let Some(index) = entry.get("index").and_then(Value::as_u64) else {
			return Err(eyre::eyre!("Rerank entry has no index."));
		};
		let Some(score) =
			entry.get("relevance_score").or_else(|| entry.get("score")).and_then(Value::as_f64)
		else {
			return Err(eyre::eyre!("Rerank entry has no score."));
		};

		// An index past the batch is provider noise, not worth failing over.
		if let Some(slot) = scores.get_mut(index as usize) {
			*slot = score as f32;
		}
	}

	Ok(scores)
}
