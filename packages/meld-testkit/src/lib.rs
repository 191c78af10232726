mod error;

pub use error::{Error, Result};

use std::time::Duration;

use tokio::time;

use meld_config::{Config, ProviderConfig};
use meld_domain::SearchHit;
use meld_pipeline::{BoxFuture, LexicalSearchProvider, RerankProvider, VectorSearchProvider};

/// Returns a canned hit list, in order.
pub struct StaticSearch(pub Vec<SearchHit>);

/// Fails every call with the given message.
pub struct FailingSearch(pub &'static str);

/// Sleeps past the configured budget before answering, to exercise the
/// timeout path.
pub struct SlowSearch(pub Duration, pub Vec<SearchHit>);

/// Returns canned scores index-aligned with the document batch.
pub struct StaticRerank(pub Vec<f32>);

pub struct FailingRerank;

pub struct SlowRerank(pub Duration);

impl VectorSearchProvider for StaticSearch {
	fn search<'a>(
		&'a self,
		_: &'a ProviderConfig,
		_: &'a str,
		_: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<SearchHit>>> {
		Box::pin(async { Ok(self.0.clone()) })
	}
}

impl LexicalSearchProvider for StaticSearch {
	fn search<'a>(
		&'a self,
		_: &'a ProviderConfig,
		_: &'a str,
		_: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<SearchHit>>> {
		Box::pin(async { Ok(self.0.clone()) })
	}
}

impl VectorSearchProvider for FailingSearch {
	fn search<'a>(
		&'a self,
		_: &'a ProviderConfig,
		_: &'a str,
		_: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<SearchHit>>> {
		Box::pin(async { Err(color_eyre::eyre::eyre!(self.0)) })
	}
}

impl LexicalSearchProvider for FailingSearch {
	fn search<'a>(
		&'a self,
		_: &'a ProviderConfig,
		_: &'a str,
		_: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<SearchHit>>> {
		Box::pin(async { Err(color_eyre::eyre::eyre!(self.0)) })
	}
}

impl VectorSearchProvider for SlowSearch {
	fn search<'a>(
		&'a self,
		_: &'a ProviderConfig,
		_: &'a str,
		_: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<SearchHit>>> {
		Box::pin(async {
			time::sleep(self.0).await;

			Ok(self.1.clone())
		})
	}
}

impl LexicalSearchProvider for SlowSearch {
	fn search<'a>(
		&'a self,
		_: &'a ProviderConfig,
		_: &'a str,
		_: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<SearchHit>>> {
		Box::pin(async {
			time::sleep(self.0).await;

			Ok(self.1.clone())
		})
	}
}

impl RerankProvider for StaticRerank {
	fn rerank<'a>(
		&'a self,
		_: &'a ProviderConfig,
		_: &'a str,
		_: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
		Box::pin(async { Ok(self.0.clone()) })
	}
}

impl RerankProvider for FailingRerank {
	fn rerank<'a>(
		&'a self,
		_: &'a ProviderConfig,
		_: &'a str,
		_: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
		Box::pin(async { Err(color_eyre::eyre::eyre!("rerank endpoint unavailable")) })
	}
}

impl RerankProvider for SlowRerank {
	fn rerank<'a>(
		&'a self,
		_: &'a ProviderConfig,
		_: &'a str,
		docs: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
		Box::pin(async {
			time::sleep(self.0).await;

			Ok(vec![0.0; docs.len()])
		})
	}
}

pub fn hit(id: &str, score: f32, snippet: &str) -> SearchHit {
	SearchHit { id: id.to_string(), score, snippet: snippet.to_string() }
}

/// A valid config with deliberately short provider budgets, so the slow fakes
/// trip the timeout path without slowing the suite down.
pub fn test_config() -> Result<Config> {
	let cfg: Config = toml::from_str(
		r#"
		[retrieval]
		depth = 20

		[fusion]
		rrf_k = 60

		[rerank]
		rerank_k = 10

		[diversity]
		mmr_lambda = 0.7

		[providers.vector]
		provider_id = "vector-test"
		api_base    = "http://127.0.0.1:9"
		api_key     = "test-key"
		path        = "/search"
		model       = "test-embed"
		timeout_ms  = 50

		[providers.lexical]
		provider_id = "lexical-test"
		api_base    = "http://127.0.0.1:9"
		api_key     = "test-key"
		path        = "/search"
		model       = "test-bm25"
		timeout_ms  = 50

		[providers.rerank]
		provider_id = "rerank-test"
		api_base    = "http://127.0.0.1:9"
		api_key     = "test-key"
		path        = "/rerank"
		model       = "test-scorer"
		timeout_ms  = 50
		"#,
	)?;

	meld_config::validate(&cfg).map_err(|err| Error::Message(err.to_string()))?;

	Ok(cfg)
}
