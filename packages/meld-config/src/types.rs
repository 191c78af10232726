use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub retrieval: Retrieval,
	pub fusion: Fusion,
	pub rerank: Rerank,
	pub diversity: Diversity,
	pub providers: Providers,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Retrieval {
	/// Per-source retrieval depth: how many hits each source is asked for.
	#[serde(default = "default_depth")]
	pub depth: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Fusion {
	/// Reciprocal Rank Fusion damping constant.
	#[serde(default = "default_rrf_k")]
	pub rrf_k: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rerank {
	/// How many fused candidates are sent to the pairwise scorer per query.
	/// Batch cost scales with this, so it must stay small.
	#[serde(default = "default_rerank_k")]
	pub rerank_k: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Diversity {
	/// MMR relevance/diversity trade-off. 1.0 is pure relevance, 0.0 is pure
	/// diversity.
	#[serde(default = "default_mmr_lambda")]
	pub mmr_lambda: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub vector: ProviderConfig,
	pub lexical: ProviderConfig,
	pub rerank: ProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

fn default_depth() -> u32 {
	50
}

fn default_rrf_k() -> u32 {
	60
}

fn default_rerank_k() -> u32 {
	10
}

fn default_mmr_lambda() -> f32 {
	0.7
}
