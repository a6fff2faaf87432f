//! E2E test: the async demo fans out and joins, so total latency is close
//! to the longest task, not the sum.

use std::time::Instant;

use actix_web::test::TestRequest;

use super::test_helpers::*;

/// Three tasks sleeping 1s/2s/3s complete together in ~3s, with generous
/// tolerance - nowhere near the 6s a sequential run would take.
#[actix_rt::test]
async fn test_async_example_runs_concurrently() {
    let app = create_test_app(&[TEST_API_KEY_1]).await;

    let started = Instant::now();
    let (status, body) =
        json_request(&app, TestRequest::get().uri("/test/async-example/")).await;
    let elapsed = started.elapsed();

    assert_eq!(status, 200, "demo should succeed: {:?}", body);

    let results = body["results"].as_array().expect("results should be a list");
    assert_eq!(results.len(), 3);
    for result in results {
        assert!(result["task"].is_string());
        assert!(result["elapsed_ms"].as_u64().unwrap() >= result["requested_ms"].as_u64().unwrap());
    }

    let total_ms = body["total_elapsed_ms"].as_u64().unwrap();
    assert!(total_ms >= 2_900, "joined too early: {}ms", total_ms);
    assert!(total_ms < 4_000, "tasks ran sequentially: {}ms", total_ms);
    assert!(elapsed.as_secs_f64() < 4.5, "request took {:?}", elapsed);
}
