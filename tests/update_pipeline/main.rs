use std::time::Duration;

use hyperevm_gas_tracker::background::badge::{Badge, MID_COLOR};
use hyperevm_gas_tracker::background::gas_state::GasState;
use hyperevm_gas_tracker::background::price_cache::TokenPriceLookup;
use hyperevm_gas_tracker::background::update_pipeline::UpdatePipeline;
use hyperevm_gas_tracker::clients::price_api::PriceApiClient;
use hyperevm_gas_tracker::config::AppConfig;
use hyperevm_gas_tracker::errors::pipeline_error::PipelineError;
use hyperevm_gas_tracker::storage::gas_store::GasStore;
use once_cell::sync::Lazy;
use serde_json::json;
use tokio::time::Instant;
use wiremock::{
    matchers::{body_partial_json, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

//
// ----------- Global Setup -----------
//

static INIT: Lazy<()> = Lazy::new(|| {
    dotenvy::dotenv().ok();
});

const PRICE_PATH: &str = "/simple/price";

//
// ----------- Test Helpers -----------
//

fn test_config(rpc: &MockServer, prices: &MockServer) -> AppConfig {
    AppConfig {
        rpc_url: rpc.uri(),
        price_api_base_url: format!("{}{}", prices.uri(), PRICE_PATH),
        ..AppConfig::default()
    }
}

fn build_pipeline(config: &AppConfig, store: GasStore, badge: Badge) -> UpdatePipeline {
    UpdatePipeline::from_config(config, store, badge).expect("should build pipeline")
}

/// RPC mock answering `eth_gasPrice` with the given JSON-RPC body.
async fn mount_rpc(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "jsonrpc": "2.0", "method": "eth_gasPrice" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn price_mock(usd: f64) -> Mock {
    Mock::given(method("GET"))
        .and(path(PRICE_PATH))
        .and(query_param("ids", "hyperliquid"))
        .and(query_param("vs_currencies", "usd"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "hyperliquid": { "usd": usd } })),
        )
}

fn one_gwei() -> serde_json::Value {
    json!({ "jsonrpc": "2.0", "id": 1, "result": "0x3b9aca00" })
}

//
// ----------- Happy Path Tests -----------
//

#[tokio::test]
async fn refresh_derives_tiers_persists_and_renders_badge() {
    let _ = *INIT;

    let rpc = MockServer::start().await;
    let prices = MockServer::start().await;
    mount_rpc(&rpc, one_gwei()).await;
    price_mock(25.5).expect(1).mount(&prices).await;

    let store = GasStore::in_memory();
    let badge = Badge::new();
    let mut pipeline = build_pipeline(&test_config(&rpc, &prices), store.clone(), badge.clone());

    let state = pipeline.refresh_gas_state().await.expect("refresh should succeed");

    assert_eq!(state.normal, 1.0);
    assert_eq!(state.fast, 1.25);
    assert_eq!(state.instant, 1.5);
    assert_eq!(state.token_price_usd, 25.5);
    assert!(state.last_update.is_some());

    assert_eq!(pipeline.state(), &state);
    assert_eq!(store.load_gas_state().await.unwrap(), Some(state));

    let rendered = badge.current().expect("badge should be rendered");
    assert_eq!(rendered.text, "1");
    assert_eq!(rendered.color, MID_COLOR);
}

#[tokio::test]
async fn identical_upstreams_persist_identical_snapshots() {
    let _ = *INIT;

    let rpc = MockServer::start().await;
    let prices = MockServer::start().await;
    mount_rpc(&rpc, json!({ "jsonrpc": "2.0", "id": 1, "result": "0x12a05f200" })).await;
    // Second run is served from the price cache.
    price_mock(31.0).expect(1).mount(&prices).await;

    let store = GasStore::in_memory();
    let mut pipeline = build_pipeline(&test_config(&rpc, &prices), store.clone(), Badge::new());

    pipeline.refresh_gas_state().await.unwrap();
    let first = store.load_gas_state().await.unwrap().unwrap();
    pipeline.refresh_gas_state().await.unwrap();
    let second = store.load_gas_state().await.unwrap().unwrap();

    let strip = |state: GasState| GasState {
        last_update: None,
        ..state
    };
    assert_eq!(
        serde_json::to_vec(&strip(first)).unwrap(),
        serde_json::to_vec(&strip(second)).unwrap()
    );
}

#[tokio::test]
async fn initialize_restores_persisted_state_before_first_run() {
    let _ = *INIT;

    let rpc = MockServer::start().await;
    let prices = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&rpc)
        .await;

    let store = GasStore::in_memory();
    let persisted = GasState::derive(12.0, 30.0, chrono::Utc::now());
    store.save_gas_state(&persisted).await.unwrap();

    let badge = Badge::new();
    let mut pipeline = build_pipeline(&test_config(&rpc, &prices), store.clone(), badge.clone());
    pipeline.initialize().await;

    assert_eq!(pipeline.state(), &persisted);
    assert_eq!(badge.current().unwrap().text, "12");
    assert_eq!(store.load_gas_state().await.unwrap(), Some(persisted));
}

#[tokio::test]
async fn spawned_pipeline_answers_refresh_requests() {
    let _ = *INIT;

    let rpc = MockServer::start().await;
    let prices = MockServer::start().await;
    mount_rpc(&rpc, one_gwei()).await;
    price_mock(25.5).mount(&prices).await;

    let store = GasStore::in_memory();
    let handle = build_pipeline(&test_config(&rpc, &prices), store.clone(), Badge::new()).spawn();

    let response = handle.refresh_now().await;
    assert!(response.success);
    assert!(response.error.is_none());

    let snapshot = handle.snapshot().await.expect("pipeline should be running");
    assert_eq!(snapshot.normal, 1.0);
    assert_eq!(store.load_gas_state().await.unwrap(), Some(snapshot));
}

//
// ----------- Price Cache Tests -----------
//

#[tokio::test]
async fn price_lookups_within_window_hit_upstream_once() {
    let _ = *INIT;

    let prices = MockServer::start().await;
    price_mock(25.5).expect(2).mount(&prices).await;

    let client = PriceApiClient::new(
        format!("{}{}", prices.uri(), PRICE_PATH),
        "hyperliquid",
        reqwest::Client::new(),
    );
    let mut lookup = TokenPriceLookup::new(client, Duration::from_secs(60));

    let start = Instant::now();
    assert_eq!(lookup.get_token_price_at(start).await, 25.5);
    assert_eq!(
        lookup.get_token_price_at(start + Duration::from_secs(30)).await,
        25.5
    );
    // Outside the window a new call is made.
    assert_eq!(
        lookup.get_token_price_at(start + Duration::from_secs(61)).await,
        25.5
    );
    assert_eq!(
        lookup.cache().fetched_at,
        Some(start + Duration::from_secs(61))
    );
}

//
// ----------- Sad Path Tests -----------
//

#[tokio::test]
async fn rpc_error_leaves_state_and_storage_untouched() {
    let _ = *INIT;

    let rpc = MockServer::start().await;
    let prices = MockServer::start().await;
    mount_rpc(
        &rpc,
        json!({ "jsonrpc": "2.0", "id": 1, "error": { "code": -1, "message": "x" } }),
    )
    .await;
    price_mock(25.5).expect(0).mount(&prices).await;

    let store = GasStore::in_memory();
    let mut changes = store.subscribe();
    let badge = Badge::new();
    let mut pipeline = build_pipeline(&test_config(&rpc, &prices), store.clone(), badge.clone());

    let result = pipeline.refresh_gas_state().await;

    assert!(matches!(
        result,
        Err(PipelineError::Rpc { code: -1, ref message }) if message == "x"
    ));
    assert_eq!(pipeline.state(), &GasState::default());
    assert!(store.load_gas_state().await.unwrap().is_none());
    assert!(changes.try_recv().is_err());
    assert!(badge.current().is_none());
}

#[tokio::test]
async fn malformed_gas_price_is_rejected() {
    let _ = *INIT;

    let rpc = MockServer::start().await;
    let prices = MockServer::start().await;
    mount_rpc(&rpc, json!({ "jsonrpc": "2.0", "id": 1, "result": "not-hex" })).await;

    let store = GasStore::in_memory();
    let mut pipeline = build_pipeline(&test_config(&rpc, &prices), store.clone(), Badge::new());

    assert!(matches!(
        pipeline.refresh_gas_state().await,
        Err(PipelineError::MalformedResponse(_))
    ));
    assert!(store.load_gas_state().await.unwrap().is_none());
}

#[tokio::test]
async fn price_api_failure_still_persists_fees() {
    let _ = *INIT;

    let rpc = MockServer::start().await;
    let prices = MockServer::start().await;
    mount_rpc(&rpc, one_gwei()).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&prices)
        .await;

    let store = GasStore::in_memory();
    let mut pipeline = build_pipeline(&test_config(&rpc, &prices), store.clone(), Badge::new());

    let state = pipeline.refresh_gas_state().await.expect("fees should still be derived");

    assert_eq!(state.normal, 1.0);
    assert_eq!(state.fast, 1.25);
    assert_eq!(state.instant, 1.5);
    assert_eq!(state.token_price_usd, 0.0);
    assert_eq!(store.load_gas_state().await.unwrap(), Some(state));
    assert!(pipeline.price_cache().fetched_at.is_none());
}

#[tokio::test]
async fn price_api_failure_falls_back_to_stale_price() {
    let _ = *INIT;

    let rpc = MockServer::start().await;
    let prices = MockServer::start().await;
    mount_rpc(&rpc, one_gwei()).await;
    price_mock(25.5).up_to_n_times(1).mount(&prices).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
        .mount(&prices)
        .await;

    let config = AppConfig {
        price_cache_ttl_secs: 0,
        ..test_config(&rpc, &prices)
    };
    let mut pipeline = build_pipeline(&config, GasStore::in_memory(), Badge::new());

    let first = pipeline.refresh_gas_state().await.unwrap();
    let fetched_at = pipeline.price_cache().fetched_at;
    let second = pipeline.refresh_gas_state().await.unwrap();

    assert_eq!(first.token_price_usd, 25.5);
    assert_eq!(second.token_price_usd, 25.5);
    assert_eq!(pipeline.price_cache().fetched_at, fetched_at);
}

#[tokio::test]
async fn missing_usd_field_is_treated_as_zero() {
    let _ = *INIT;

    let rpc = MockServer::start().await;
    let prices = MockServer::start().await;
    mount_rpc(&rpc, one_gwei()).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "hyperliquid": {} })))
        .mount(&prices)
        .await;

    let mut pipeline = build_pipeline(
        &test_config(&rpc, &prices),
        GasStore::in_memory(),
        Badge::new(),
    );

    let state = pipeline.refresh_gas_state().await.unwrap();
    assert_eq!(state.token_price_usd, 0.0);
    assert!(pipeline.price_cache().fetched_at.is_some());
}
