use std::{sync::Arc, time::Duration};

use meld_domain::Source;
use meld_pipeline::{
	Error, LexicalSearchProvider, Providers, RankRequest, RankingPipeline, RerankProvider,
	VectorSearchProvider,
};
use meld_testkit::{
	FailingRerank, FailingSearch, SlowRerank, SlowSearch, StaticRerank, StaticSearch, hit,
	test_config,
};

fn pipeline(
	vector: Arc<dyn VectorSearchProvider>,
	lexical: Arc<dyn LexicalSearchProvider>,
	rerank: Arc<dyn RerankProvider>,
) -> RankingPipeline {
	let cfg = test_config().expect("test config must be valid");

	RankingPipeline::with_providers(cfg, Providers::new(vector, lexical, rerank))
}

fn request(query: &str, top_k: u32) -> RankRequest {
	RankRequest { query: query.to_string(), top_k }
}

#[tokio::test]
async fn reranked_order_wins_over_fused_order() {
	// Fused order is b, a, c (b appears in both lists); the scorer disagrees.
	let pipeline = pipeline(
		Arc::new(StaticSearch(vec![hit("a", 0.9, "alpha doc"), hit("b", 0.8, "bravo doc")])),
		Arc::new(StaticSearch(vec![hit("b", 7.0, "bravo doc"), hit("c", 5.0, "charlie doc")])),
		Arc::new(StaticRerank(vec![0.1, 0.9, 0.5])),
	);
	let res = pipeline.rank(request("query", 3)).await.expect("rank failed");
	let ids = res.results.iter().map(|r| r.id.as_str()).collect::<Vec<_>>();

	assert_eq!(ids, vec!["a", "c", "b"]);
	assert!((res.results[0].final_score - 0.9).abs() < f32::EPSILON);
	assert!(res.diagnostics.used_vector);
	assert!(res.diagnostics.used_lexical);
	assert!(res.diagnostics.reranked);
	assert!(res.diagnostics.diversity_applied);
}

#[tokio::test]
async fn failed_rerank_keeps_fused_order() {
	let pipeline = pipeline(
		Arc::new(StaticSearch(vec![hit("a", 0.9, "alpha doc"), hit("b", 0.8, "bravo doc")])),
		Arc::new(StaticSearch(vec![hit("b", 7.0, "bravo doc"), hit("c", 5.0, "charlie doc")])),
		Arc::new(FailingRerank),
	);
	let res = pipeline.rank(request("query", 3)).await.expect("rank failed");
	let ids = res.results.iter().map(|r| r.id.as_str()).collect::<Vec<_>>();

	assert_eq!(ids, vec!["b", "a", "c"]);
	assert!(!res.diagnostics.reranked);
}

#[tokio::test]
async fn mismatched_score_count_keeps_fused_order() {
	let pipeline = pipeline(
		Arc::new(StaticSearch(vec![hit("a", 0.9, "alpha doc"), hit("b", 0.8, "bravo doc")])),
		Arc::new(StaticSearch(vec![hit("c", 5.0, "charlie doc")])),
		Arc::new(StaticRerank(vec![0.5])),
	);
	let res = pipeline.rank(request("query", 3)).await.expect("rank failed");

	assert_eq!(res.results.len(), 3);
	assert!(!res.diagnostics.reranked);
}

#[tokio::test]
async fn one_failed_source_degrades_to_the_other() {
	let pipeline = pipeline(
		Arc::new(FailingSearch("vector store offline")),
		Arc::new(StaticSearch(vec![hit("c", 5.0, "charlie doc"), hit("d", 4.0, "delta doc")])),
		Arc::new(FailingRerank),
	);
	let res = pipeline.rank(request("query", 2)).await.expect("rank failed");
	let ids = res.results.iter().map(|r| r.id.as_str()).collect::<Vec<_>>();

	assert_eq!(ids, vec!["c", "d"]);
	assert!(!res.diagnostics.used_vector);
	assert!(res.diagnostics.used_lexical);
	assert_eq!(res.results[0].sources, vec![Source::Lexical]);
}

#[tokio::test]
async fn slow_source_times_out_and_degrades() {
	let pipeline = pipeline(
		Arc::new(SlowSearch(Duration::from_millis(500), vec![hit("a", 0.9, "alpha doc")])),
		Arc::new(StaticSearch(vec![hit("c", 5.0, "charlie doc")])),
		Arc::new(FailingRerank),
	);
	let res = pipeline.rank(request("query", 2)).await.expect("rank failed");
	let ids = res.results.iter().map(|r| r.id.as_str()).collect::<Vec<_>>();

	assert_eq!(ids, vec!["c"]);
	assert!(!res.diagnostics.used_vector);
	assert!(res.diagnostics.used_lexical);
}

#[tokio::test]
async fn slow_rerank_times_out_and_keeps_fused_order() {
	let pipeline = pipeline(
		Arc::new(StaticSearch(vec![hit("a", 0.9, "alpha doc"), hit("b", 0.8, "bravo doc")])),
		Arc::new(StaticSearch(Vec::new())),
		Arc::new(SlowRerank(Duration::from_millis(500))),
	);
	let res = pipeline.rank(request("query", 2)).await.expect("rank failed");
	let ids = res.results.iter().map(|r| r.id.as_str()).collect::<Vec<_>>();

	assert_eq!(ids, vec!["a", "b"]);
	assert!(!res.diagnostics.reranked);
	assert!(res.diagnostics.used_vector);
}

#[tokio::test]
async fn dropping_an_in_flight_query_leaves_the_pipeline_usable() {
	let pipeline = pipeline(
		Arc::new(SlowSearch(Duration::from_millis(500), vec![hit("a", 0.9, "alpha doc")])),
		Arc::new(StaticSearch(vec![hit("c", 5.0, "charlie doc")])),
		Arc::new(FailingRerank),
	);
	// Cancel the caller side while retrieval is still in flight; dropping the
	// future must cancel the pending calls rather than wedge anything.
	let cancelled =
		tokio::time::timeout(Duration::from_millis(5), pipeline.rank(request("query", 1))).await;

	assert!(cancelled.is_err());

	let res = pipeline.rank(request("query", 1)).await.expect("rank failed");

	assert_eq!(res.results[0].id, "c");
	assert!(!res.diagnostics.used_vector);
	assert!(res.diagnostics.used_lexical);
}

#[tokio::test]
async fn both_sources_failing_is_fatal() {
	let pipeline = pipeline(
		Arc::new(FailingSearch("vector store offline")),
		Arc::new(FailingSearch("index rebuilding")),
		Arc::new(FailingRerank),
	);
	let err = pipeline.rank(request("query", 2)).await.expect_err("rank should fail");

	assert!(matches!(err, Error::NoCandidates));
}

#[tokio::test]
async fn empty_but_healthy_sources_return_an_empty_success() {
	let pipeline = pipeline(
		Arc::new(StaticSearch(Vec::new())),
		Arc::new(StaticSearch(Vec::new())),
		Arc::new(StaticRerank(Vec::new())),
	);
	let res = pipeline.rank(request("query with no matches", 5)).await.expect("rank failed");

	assert!(res.results.is_empty());
	assert!(res.diagnostics.used_vector);
	assert!(res.diagnostics.used_lexical);
	assert!(!res.diagnostics.reranked);
	assert!(!res.diagnostics.diversity_applied);
}

#[tokio::test]
async fn near_duplicate_snippets_are_demoted() {
	// b repeats a's snippet verbatim; c is distinct but scores lower. MMR
	// should hand slot two to c.
	let pipeline = pipeline(
		Arc::new(StaticSearch(vec![
			hit("a", 0.9, "rust async runtime internals"),
			hit("b", 0.8, "rust async runtime internals"),
			hit("c", 0.7, "postgres query planner notes"),
		])),
		Arc::new(StaticSearch(Vec::new())),
		Arc::new(StaticRerank(vec![1.0, 0.95, 0.6])),
	);
	let res = pipeline.rank(request("query", 2)).await.expect("rank failed");
	let ids = res.results.iter().map(|r| r.id.as_str()).collect::<Vec<_>>();

	assert_eq!(ids, vec!["a", "c"]);
}

#[tokio::test]
async fn invalid_requests_are_rejected_before_retrieval() {
	let pipeline = pipeline(
		Arc::new(FailingSearch("never called")),
		Arc::new(FailingSearch("never called")),
		Arc::new(FailingRerank),
	);

	assert!(matches!(
		pipeline.rank(request("query", 0)).await,
		Err(Error::InvalidRequest { .. })
	));
	assert!(matches!(
		pipeline.rank(request("   ", 5)).await,
		Err(Error::InvalidRequest { .. })
	));
}

#[tokio::test]
async fn results_never_exceed_top_k() {
	let pipeline = pipeline(
		Arc::new(StaticSearch(vec![
			hit("a", 0.9, "alpha doc"),
			hit("b", 0.8, "bravo doc"),
			hit("c", 0.7, "charlie doc"),
			hit("d", 0.6, "delta doc"),
		])),
		Arc::new(StaticSearch(Vec::new())),
		Arc::new(StaticRerank(vec![0.4, 0.3, 0.2, 0.1])),
	);
	let res = pipeline.rank(request("query", 2)).await.expect("rank failed");

	assert_eq!(res.results.len(), 2);
}
