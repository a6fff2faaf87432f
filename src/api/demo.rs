//! Async concurrency demo endpoint.
//!
//! Launches three independent fixed-duration sleeps as separate tasks and
//! joins them all. Total latency is close to the longest sleep, not the
//! sum - the fan-out and the join are explicit in the handler's own
//! control flow rather than hidden in framework glue.

use std::time::{Duration, Instant};

use actix_web::HttpResponse;
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Sleep durations for the demo tasks, in seconds.
const DEMO_TASKS: &[(&str, u64)] = &[("task-1", 1), ("task-2", 2), ("task-3", 3)];

/// Per-task timing result.
#[derive(Debug, Clone, Serialize)]
pub struct TaskResult {
    pub task: String,
    pub requested_ms: u64,
    pub elapsed_ms: u64,
}

#[derive(Serialize)]
struct AsyncDemoResponse {
    message: &'static str,
    results: Vec<TaskResult>,
    total_elapsed_ms: u64,
}

/// Spawn one sleeper per entry, then wait for all of them (fan-out/fan-in).
pub async fn run_concurrent_sleeps(tasks: &[(&str, Duration)]) -> AppResult<Vec<TaskResult>> {
    let handles: Vec<_> = tasks
        .iter()
        .map(|(name, duration)| {
            let name = name.to_string();
            let duration = *duration;
            tokio::spawn(async move {
                let started = Instant::now();
                tokio::time::sleep(duration).await;
                TaskResult {
                    task: name,
                    requested_ms: duration.as_millis() as u64,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                }
            })
        })
        .collect();

    let joined = futures_util::future::join_all(handles).await;
    joined
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Internal(format!("demo task failed: {}", e)))
}

/// Concurrency demo endpoint. Exempt from authentication.
pub async fn async_example() -> AppResult<HttpResponse> {
    let started = Instant::now();

    let tasks: Vec<(&str, Duration)> = DEMO_TASKS
        .iter()
        .map(|(name, secs)| (*name, Duration::from_secs(*secs)))
        .collect();
    let results = run_concurrent_sleeps(&tasks).await?;

    Ok(HttpResponse::Ok().json(AsyncDemoResponse {
        message: "Async tasks completed",
        results,
        total_elapsed_ms: started.elapsed().as_millis() as u64,
    }))
}
