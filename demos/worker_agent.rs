//! # Example: worker agent
//!
//! Dispatches a burst of simulated jobs onto a small pool and prints every
//! lifecycle event as it happens.
//!
//! Demonstrates how to:
//! - Bind positional and named arguments to a blocking task body.
//! - Register global callbacks once and add a local `finished` callback per dispatch.
//! - Watch occupancy (`active/max`) while jobs queue up behind a bounded pool.
//! - Let a failing job report through `failed` without disturbing the rest.
//!
//! ## Run
//! ```bash
//! cargo run --example worker_agent
//! RUST_LOG=taskagent=debug cargo run --example worker_agent
//! TASKAGENT_CAPACITY=4 cargo run --example worker_agent
//! ```

use std::time::Duration;

use rand::Rng;
use serde_json::json;
use taskagent::{
    BlockingFn, CallbackSet, Dispatcher, Event, EventKind, LifecycleEvent, PoolConfig, TaskArgs,
    TaskContext, TaskError, TaskRef, TaskSpec,
};
use tracing_subscriber::EnvFilter;

const JOBS: usize = 8;

/// Sleeps for `duration_ms`, then reports which worker did the job.
fn simulated_job() -> TaskRef {
    BlockingFn::arc("simulated_job", |ctx: TaskContext| -> Result<serde_json::Value, TaskError> {
        let label = ctx.args.require_str(0)?.to_string();
        let duration_ms = ctx
            .args
            .get(1)
            .and_then(|v| v.as_u64())
            .ok_or_else(|| TaskError::invalid_args("argument 1 (duration_ms) must be an integer"))?;
        let mode = ctx.args.named_str_or("mode", "normal")?;

        std::thread::sleep(Duration::from_millis(duration_ms));
        if mode == "faulty" {
            return Err(TaskError::fail(format!("{label} hit a simulated fault")));
        }
        Ok(json!({
            "label": label,
            "slept_ms": duration_ms,
            "worker": ctx.worker.to_string(),
        }))
    })
}

fn global_callbacks() -> CallbackSet {
    CallbackSet::new()
        .on(EventKind::Started, |ev: &Event| {
            if let LifecycleEvent::Started(worker) = &ev.lifecycle {
                println!("[{}] {} started on {worker}", ev.job, ev.task);
            }
        })
        .on(EventKind::Succeeded, |ev: &Event| {
            if let Some(value) = ev.value() {
                println!("[{}] {} succeeded: {value}", ev.job, ev.task);
            }
        })
        .on(EventKind::Failed, |ev: &Event| {
            if let Some(fault) = ev.fault() {
                println!("[{}] {} failed: {fault}", ev.job, ev.task);
                println!("{}", fault.trace.trim_end());
            }
        })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let mut cfg = PoolConfig::from_env()?;
    if cfg.capacity == 0 {
        cfg.capacity = 3;
    }

    let dispatcher = Dispatcher::builder(cfg)
        .with_global_callbacks(global_callbacks())
        .build()?;
    println!("agent ready: 0/{} workers busy", dispatcher.capacity());

    let task = simulated_job();
    let mut rng = rand::thread_rng();
    let mut handles = Vec::with_capacity(JOBS);

    for i in 1..=JOBS {
        let duration_ms: u64 = rng.gen_range(100..600);
        let mode = if rng.gen_bool(0.2) { "faulty" } else { "normal" };
        let args = TaskArgs::new()
            .arg(format!("job #{i}"))
            .arg(duration_ms)
            .kwarg("mode", mode);

        let status = dispatcher.clone();
        let local = CallbackSet::new().on(EventKind::Finished, move |ev: &Event| {
            println!(
                "[{}] {} finished, {}/{} workers busy",
                ev.job,
                ev.task,
                status.active_count(),
                status.capacity()
            );
        });

        let handle = dispatcher.dispatch(TaskSpec::new(task.clone()).with_args(args), Some(local));
        println!(
            "dispatched {} ({duration_ms} ms, {mode}): {}/{} workers busy, {} queued",
            handle.id(),
            dispatcher.active_count(),
            dispatcher.capacity(),
            dispatcher.pool().pending_count()
        );
        handles.push(handle);
    }

    dispatcher.pool().wait_idle().await;

    let mut failed = 0;
    for handle in &handles {
        if handle.finished().await.is_some_and(|o| o.is_failure()) {
            failed += 1;
        }
    }
    println!("all done: {} succeeded, {failed} failed", handles.len() - failed);
    Ok(())
}
