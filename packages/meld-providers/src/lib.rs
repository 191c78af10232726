pub mod rerank;
pub mod search;

use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::{
	Client,
	header::{AUTHORIZATION, HeaderMap, HeaderName},
};
use serde_json::{Map, Value};

use meld_config::ProviderConfig;

pub(crate) fn client(cfg: &ProviderConfig) -> Result<Client> {
	Ok(Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?)
}

pub(crate) fn endpoint(cfg: &ProviderConfig) -> String {
	format!("{}{}", cfg.api_base, cfg.path)
}

/// Bearer auth plus any extra headers the deployment configures, e.g. a proxy
/// routing key. Non-string header values are a config mistake, not something
/// to coerce.
pub fn auth_headers(api_key: &str, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::with_capacity(default_headers.len() + 1);

	headers.insert(AUTHORIZATION, format!("Bearer {api_key}").parse()?);

	for (key, value) in default_headers {
		let raw = value
			.as_str()
			.ok_or_else(|| eyre::eyre!("Default header {key:?} must be a string value."))?;

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}
