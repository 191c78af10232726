use color_eyre::{Result, eyre};
use serde_json::Value;

use meld_domain::SearchHit;

/// Query one retrieval endpoint for up to `k` hits. Vector and lexical
/// deployments share this wire shape; the configured model selects the
/// ranking behind the endpoint.
pub async fn search(cfg: &meld_config::ProviderConfig, query: &str, k: u32) -> Result<Vec<SearchHit>> {
	let body = serde_json::json!({ "model": cfg.model, "query": query, "k": k });
	let res = crate::client(cfg)?
		.post(crate::endpoint(cfg))
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_search_response(json, k as usize)
}

fn parse_search_response(json: Value, k: usize) -> Result<Vec<SearchHit>> {
	let results = json
		.get("results")
		.or_else(|| json.get("data"))
		.and_then(|v| v.as_array())
		.ok_or_else(|| eyre::eyre!("Search response is missing results array."))?;
	let mut hits = Vec::with_capacity(results.len().min(k));

	for item in results {
		if hits.len() >= k {
			break;
		}

		// Items without an id cannot participate in fusion; skip them rather
		// than failing the whole list.
		let Some(id) = item_id(item) else {
			continue;
		};
		let score = item.get("score").and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
		let snippet = item
			.get("snippet")
			.or_else(|| item.get("text"))
			.and_then(|v| v.as_str())
			.unwrap_or_default()
			.to_string();

		hits.push(SearchHit { id, score, snippet });
	}

	Ok(hits)
}

fn item_id(item: &Value) -> Option<String> {
	let value = item.get("id")?;

	if let Some(text) = value.as_str() {
		return Some(text.to_string());
	}

	value.as_u64().map(|number| number.to_string())
}
