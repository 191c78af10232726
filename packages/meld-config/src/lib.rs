mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Diversity, Fusion, ProviderConfig, Providers, Rerank, Retrieval};

use std::{fs, path::Path};

/// The pairwise scorer runs on every query and its batch cost scales with the
/// slice size, so the configurable slice is hard capped.
pub const MAX_RERANK_K: u32 = 20;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.retrieval.depth == 0 {
		return Err(Error::Validation {
			message: "retrieval.depth must be greater than zero.".to_string(),
		});
	}
	if cfg.fusion.rrf_k == 0 {
		return Err(Error::Validation {
			message: "fusion.rrf_k must be greater than zero.".to_string(),
		});
	}
	if cfg.rerank.rerank_k == 0 {
		return Err(Error::Validation {
			message: "rerank.rerank_k must be greater than zero.".to_string(),
		});
	}
	if cfg.rerank.rerank_k > MAX_RERANK_K {
		return Err(Error::Validation {
			message: format!("rerank.rerank_k must be {MAX_RERANK_K} or less."),
		});
	}
	if !cfg.diversity.mmr_lambda.is_finite() {
		return Err(Error::Validation {
			message: "diversity.mmr_lambda must be a finite number.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&cfg.diversity.mmr_lambda) {
		return Err(Error::Validation {
			message: "diversity.mmr_lambda must be in the range 0.0-1.0.".to_string(),
		});
	}

	for (label, provider) in [
		("vector", &cfg.providers.vector),
		("lexical", &cfg.providers.lexical),
		("rerank", &cfg.providers.rerank),
	] {
		if provider.api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("providers.{label}.api_base must be non-empty."),
			});
		}
		if provider.api_key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("providers.{label}.api_key must be non-empty."),
			});
		}
		if provider.timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("providers.{label}.timeout_ms must be greater than zero."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	for provider in [
		&mut cfg.providers.vector,
		&mut cfg.providers.lexical,
		&mut cfg.providers.rerank,
	] {
		provider.api_base = provider.api_base.trim().to_string();
		provider.path = provider.path.trim().to_string();
	}
}
