pub mod rank;

pub use rank::{Diagnostics, RankRequest, RankResponse};

use std::{future::Future, pin::Pin, sync::Arc};

use meld_config::{Config, ProviderConfig};
use meld_domain::SearchHit;

pub type Result<T> = std::result::Result<T, Error>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait VectorSearchProvider
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		query: &'a str,
		k: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<SearchHit>>>;
}

pub trait LexicalSearchProvider
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		query: &'a str,
		k: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<SearchHit>>>;
}

pub trait RerankProvider
where
	Self: Send + Sync,
{
	fn rerank<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		query: &'a str,
		docs: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("No candidates: both retrieval sources failed or timed out.")]
	NoCandidates,
}

/// Capability handles, selected statically at construction. Per-source
/// degradations never surface through these as pipeline errors; the pipeline
/// maps them to diagnostics.
#[derive(Clone)]
pub struct Providers {
	pub vector: Arc<dyn VectorSearchProvider>,
	pub lexical: Arc<dyn LexicalSearchProvider>,
	pub rerank: Arc<dyn RerankProvider>,
}

struct DefaultProviders;

impl VectorSearchProvider for DefaultProviders {
	fn search<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		query: &'a str,
		k: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<SearchHit>>> {
		Box::pin(meld_providers::search::search(cfg, query, k))
	}
}

impl LexicalSearchProvider for DefaultProviders {
	fn search<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		query: &'a str,
		k: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<SearchHit>>> {
		Box::pin(meld_providers::search::search(cfg, query, k))
	}
}

impl RerankProvider for DefaultProviders {
	fn rerank<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		query: &'a str,
		docs: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
		Box::pin(meld_providers::rerank::rerank(cfg, query, docs))
	}
}

impl Providers {
	pub fn new(
		vector: Arc<dyn VectorSearchProvider>,
		lexical: Arc<dyn LexicalSearchProvider>,
		rerank: Arc<dyn RerankProvider>,
	) -> Self {
		Self { vector, lexical, rerank }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { vector: provider.clone(), lexical: provider.clone(), rerank: provider }
	}
}

/// Stateless per-query ranking: concurrent retrieval, RRF fusion, bounded
/// rerank, MMR diversity. Holds only immutable configuration and capability
/// handles, so one value serves unbounded concurrent queries.
pub struct RankingPipeline {
	pub cfg: Config,
	pub providers: Providers,
}

impl RankingPipeline {
	pub fn new(cfg: Config) -> Self {
		Self { cfg, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		Self { cfg, providers }
	}
}
