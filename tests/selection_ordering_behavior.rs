//! Behavior tests for the selection pipeline's ordering guarantee: the
//! final retrieval state reflects the most recently *initiated* selection,
//! not the most recently resolved one.

use stockdeck_tests::{data_calls, scripted_session, snapshot_body, RetrievalState};
use tokio::task::yield_now;

#[tokio::test(start_paused = true)]
async fn stale_response_is_discarded_when_a_newer_selection_resolved_first() {
    // Given: selection A resolves slowly, selection B instantly
    let (session, client) = scripted_session();
    client.respond_after_ms("/api/av-stock/SLOW", 5_000, 200, snapshot_body("SLOW", 1.0));
    client.respond("/api/av-stock/FAST", 200, snapshot_body("FAST", 2.0));
    let pipeline = session.pipeline().clone();

    // When: A is initiated, then B before A resolves
    let a = tokio::spawn({
        let pipeline = pipeline.clone();
        async move { pipeline.select("SLOW").await }
    });
    yield_now().await; // A publishes Loading and issues its request
    assert!(pipeline.state().is_loading());

    pipeline.select("FAST").await.expect("selection B");
    assert_eq!(
        pipeline.state().snapshot().map(|s| s.symbol.as_str()),
        Some("FAST")
    );

    // ...and A's response arrives afterwards
    a.await.expect("task").expect("selection A");

    // Then: the final state is B's result, not A's
    assert_eq!(
        pipeline.state().snapshot().map(|s| s.symbol.as_str()),
        Some("FAST"),
        "stale response must be silently discarded"
    );
}

#[tokio::test(start_paused = true)]
async fn stale_error_cannot_overwrite_a_newer_success() {
    // Given: selection A fails slowly on every endpoint, B succeeds fast
    let (session, client) = scripted_session();
    client.respond_after_ms("/api/av-stock/BAD", 4_000, 503, "");
    client.respond_after_ms("/api/test/BAD", 4_000, 503, "");
    client.respond("/api/av-stock/GOOD", 200, snapshot_body("GOOD", 3.0));
    let pipeline = session.pipeline().clone();

    let a = tokio::spawn({
        let pipeline = pipeline.clone();
        async move { pipeline.select("BAD").await }
    });
    yield_now().await;

    pipeline.select("GOOD").await.expect("selection B");
    a.await.expect("task").expect("selection A");

    match pipeline.state() {
        RetrievalState::Success(snapshot) => assert_eq!(snapshot.symbol, "GOOD"),
        other => panic!("stale exhaustion must not surface, got {other:?}"),
    }
}

#[tokio::test]
async fn data_fetch_falls_back_to_the_sample_endpoint() {
    // Given: the live endpoint is down, the sample endpoint works
    let (session, client) = scripted_session();
    client.respond("/api/av-stock/", 502, "");
    client.respond("/api/test/AAPL", 200, snapshot_body("AAPL", 150.25));

    session.pipeline().select("AAPL").await.expect("selection");

    assert_eq!(
        data_calls(&client),
        vec!["/api/av-stock/AAPL", "/api/test/AAPL"]
    );
    assert_eq!(
        session.pipeline().state().snapshot().map(|s| s.symbol.as_str()),
        Some("AAPL")
    );
}

#[tokio::test]
async fn failed_lookup_replaces_stale_data_with_an_error() {
    let (session, client) = scripted_session();
    client.respond("/api/av-stock/AAPL", 200, snapshot_body("AAPL", 150.0));

    let pipeline = session.pipeline();
    pipeline.select("AAPL").await.expect("first selection");
    assert!(pipeline.state().snapshot().is_some());

    pipeline.select("MISSING").await.expect("second selection");
    match pipeline.state() {
        RetrievalState::Error(message) => {
            assert!(message.contains("exhausted"), "got: {message}");
        }
        other => panic!("expected error state, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn loading_is_published_before_the_outcome() {
    let (session, client) = scripted_session();
    // A small delay keeps Loading observable before the outcome lands.
    client.respond_after_ms("/api/av-stock/SPY", 10, 200, snapshot_body("SPY", 512.3));

    let pipeline = session.pipeline().clone();
    let mut observed = Vec::new();
    let mut rx = pipeline.subscribe();

    let watcher = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow().clone();
            let done = !state.is_loading();
            observed.push(state);
            if done {
                break;
            }
        }
        observed
    });
    yield_now().await;

    pipeline.select("SPY").await.expect("selection");

    let observed = watcher.await.expect("watcher");
    assert!(observed[0].is_loading(), "first transition must be Loading");
    assert!(
        matches!(observed.last(), Some(RetrievalState::Success(_))),
        "final transition must be the outcome"
    );
}

#[tokio::test]
async fn selection_normalizes_case_and_whitespace() {
    let (session, client) = scripted_session();
    client.respond("/api/av-stock/AAPL", 200, snapshot_body("AAPL", 150.0));

    session.pipeline().select("  aapl ").await.expect("selection");

    assert_eq!(data_calls(&client), vec!["/api/av-stock/AAPL"]);
}

#[tokio::test(start_paused = true)]
async fn overlapping_selections_do_not_block_each_other() {
    // Three rapid selections; only the last one's outcome sticks.
    let (session, client) = scripted_session();
    client.respond_after_ms("/api/av-stock/ONE", 3_000, 200, snapshot_body("ONE", 1.0));
    client.respond_after_ms("/api/av-stock/TWO", 2_000, 200, snapshot_body("TWO", 2.0));
    client.respond("/api/av-stock/THREE", 200, snapshot_body("THREE", 3.0));
    let pipeline = session.pipeline().clone();

    let mut handles = Vec::new();
    for symbol in ["ONE", "TWO"] {
        let pipeline = pipeline.clone();
        handles.push(tokio::spawn(async move { pipeline.select(symbol).await }));
        yield_now().await;
    }
    pipeline.select("THREE").await.expect("last selection");

    for handle in handles {
        handle.await.expect("task").expect("selection");
    }

    assert_eq!(
        pipeline.state().snapshot().map(|s| s.symbol.as_str()),
        Some("THREE")
    );
}
