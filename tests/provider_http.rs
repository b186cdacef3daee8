//! Provider adapters against a mock HTTP backend.

use balance_hammer::balance::{Address, Amount};
use balance_hammer::config::{BlockcypherConfig, BlockonomicsConfig};
use balance_hammer::provider::{Blockcypher, Blockonomics, ProviderAdapter, ProviderError};
use std::time::Duration;

mod common;

fn blockcypher_at(addr: std::net::SocketAddr) -> Blockcypher {
    Blockcypher::new(BlockcypherConfig {
        base_url: format!("http://{}/v1/btc/main", addr),
        timeout_secs: 2,
        ..BlockcypherConfig::default()
    })
    .unwrap()
}

fn blockonomics_at(addr: std::net::SocketAddr) -> Blockonomics {
    Blockonomics::new(BlockonomicsConfig {
        url: format!("http://{}/api/balance", addr),
        timeout_secs: 2,
        ..BlockonomicsConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_blockcypher_batch_request() {
    let (addr, seen) = common::start_recording_backend(
        200,
        r#"[
            {"address": "a1", "balance": 1000, "unconfirmed_balance": 0, "final_balance": 1000},
            {"address": "a2", "balance": 0, "unconfirmed_balance": 25, "final_balance": 25},
            {"address": "a3", "balance": 7, "unconfirmed_balance": 0, "final_balance": 7}
        ]"#,
    )
    .await;

    let adapter = blockcypher_at(addr);
    let records = adapter
        .fetch_balances(&common::addresses(&["a1", "a2", "a3"]))
        .await
        .unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[1].unconfirmed, Amount::from_sat(25));
    assert_eq!(records[1].total, Some(Amount::from_sat(25)));

    let requests = seen.lock().unwrap().clone();
    assert_eq!(requests.len(), 1, "one request per flush");
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, "/v1/btc/main/addrs/a1;a2;a3/balance");
}

#[tokio::test]
async fn test_blockcypher_single_address_object() {
    let (addr, _) = common::start_recording_backend(
        200,
        r#"{"address": "a1", "balance": 42, "unconfirmed_balance": 0, "final_balance": 42}"#,
    )
    .await;

    let records = blockcypher_at(addr)
        .fetch_balances(&common::addresses(&["a1"]))
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].address, Address::from("a1"));
}

#[tokio::test]
async fn test_blockcypher_429_is_rate_limited() {
    let (addr, _) = common::start_recording_backend(429, r#"{"error": "Limits reached."}"#).await;

    let err = blockcypher_at(addr)
        .fetch_balances(&common::addresses(&["a1"]))
        .await
        .unwrap_err();
    assert_eq!(err, ProviderError::rate_limited("blockcypher"));
}

#[tokio::test]
async fn test_non_2xx_is_failure() {
    let (addr, _) = common::start_recording_backend(503, "maintenance").await;

    let err = blockonomics_at(addr)
        .fetch_balances(&common::addresses(&["a1"]))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Unreachable { .. }));
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_malformed_payload_is_invalid_response() {
    let (addr, _) = common::start_recording_backend(200, "<html>not json</html>").await;

    let err = blockcypher_at(addr)
        .fetch_balances(&common::addresses(&["a1", "a2"]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_response");
}

#[tokio::test]
async fn test_connection_refused_is_unreachable() {
    // Bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = blockonomics_at(addr)
        .fetch_balances(&common::addresses(&["a1"]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "unreachable");
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let addr = common::start_programmable_backend(|_| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        (200, r#"{"response": []}"#.to_string())
    })
    .await;

    let adapter = Blockonomics::new(BlockonomicsConfig {
        url: format!("http://{}/api/balance", addr),
        timeout_secs: 1,
        ..BlockonomicsConfig::default()
    })
    .unwrap();

    let err = adapter.fetch_balances(&common::addresses(&["a1"])).await.unwrap_err();
    assert!(matches!(err, ProviderError::Unreachable { ref message, .. } if message.contains("timed out")));
}

#[tokio::test]
async fn test_blockonomics_post_body_and_totals() {
    let (addr, seen) = common::start_recording_backend(
        200,
        r#"{"response": [
            {"addr": "a1", "confirmed": 1500, "unconfirmed": 20},
            {"addr": "a3", "confirmed": 0, "unconfirmed": 0}
        ]}"#,
    )
    .await;

    let records = blockonomics_at(addr)
        .fetch_balances(&common::addresses(&["a1", "a2", "a3"]))
        .await
        .unwrap();

    // a2 omitted by the provider
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].total, None);

    let requests = seen.lock().unwrap().clone();
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/api/balance");
    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body["addr"], "a1 a2 a3");
}
