//! Fetcher behavior against a local mock server: retry, backoff ordering,
//! terminal classification, and rate-limiter gating.

use std::time::{Duration, Instant};

use httpmock::prelude::*;

use lectio_core::{FetchError, FetchOptions, Fetcher, RateLimiter};

fn fetcher(max_retries: u32, base_delay_ms: u64, interval_ms: u64) -> Fetcher {
    Fetcher::new(
        RateLimiter::new(Duration::from_millis(interval_ms)),
        FetchOptions {
            max_retries,
            base_delay: Duration::from_millis(base_delay_ms),
            timeout: Duration::from_secs(5),
        },
    )
}

#[test]
fn success_returns_body() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/psalms/23");
        then.status(200).body("The Lord is my shepherd");
    });

    let body = fetcher(3, 1, 0).fetch_text(&server.url("/psalms/23")).unwrap();
    assert_eq!(body, "The Lord is my shepherd");
    mock.assert_hits(1);
}

#[test]
fn not_found_is_terminal_and_immediate() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/psalms/151");
        then.status(404);
    });

    let err = fetcher(3, 1, 0)
        .fetch_text(&server.url("/psalms/151"))
        .unwrap_err();
    assert!(matches!(err, FetchError::NotFound { .. }));
    // never retried, even with retries budgeted
    mock.assert_hits(1);
}

#[test]
fn server_error_retries_then_gives_up() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/flaky");
        then.status(503);
    });

    let err = fetcher(2, 1, 0).fetch_text(&server.url("/flaky")).unwrap_err();
    match err {
        FetchError::Http { status, .. } => assert_eq!(status, 503),
        other => panic!("unexpected error: {other}"),
    }
    // initial attempt + 2 retries
    mock.assert_hits(3);
}

#[test]
fn client_error_is_terminal() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/forbidden");
        then.status(403);
    });

    let err = fetcher(3, 1, 0)
        .fetch_text(&server.url("/forbidden"))
        .unwrap_err();
    assert!(matches!(err, FetchError::Http { status: 403, .. }));
    mock.assert_hits(1);
}

#[test]
fn recovers_after_transient_server_errors() {
    let server = MockServer::start();
    let mut failing = server.mock(|when, then| {
        when.method(GET).path("/intermittent");
        then.status(503);
    });

    // Generous backoff so the main thread can swap mocks between the
    // second failure and the third attempt (503, 503, then 200).
    let worker = {
        let url = server.url("/intermittent");
        std::thread::spawn(move || fetcher(3, 200, 0).fetch_text(&url))
    };

    let deadline = Instant::now() + Duration::from_secs(5);
    while failing.hits() < 2 {
        assert!(Instant::now() < deadline, "mock never reached 2 hits");
        std::thread::sleep(Duration::from_millis(10));
    }
    let failed_hits = failing.hits();
    failing.delete();
    let ok = server.mock(|when, then| {
        when.method(GET).path("/intermittent");
        then.status(200).body("recovered");
    });

    let body = worker.join().expect("fetch thread panicked").unwrap();
    assert_eq!(body, "recovered");
    assert_eq!(failed_hits, 2);
    ok.assert_hits(1);
}

#[test]
fn every_attempt_is_gated_by_the_limiter() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/slow-lane");
        then.status(503);
    });

    let start = Instant::now();
    let _ = fetcher(2, 1, 60).fetch_text(&server.url("/slow-lane"));
    // 3 attempts → 2 gated dispatches at >= 60ms apart
    assert!(start.elapsed() >= Duration::from_millis(120));
    mock.assert_hits(3);
}
