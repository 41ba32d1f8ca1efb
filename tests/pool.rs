mod common;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use common::{entries, failing, gated, instant, new_log, recorder, within};
use serde_json::{Value, json};
use taskagent::{
    BlockingFn, CallbackSet, DispatchError, Event, EventKind, JobState, Notification, Outcome,
    PANIC_LABEL, PoolConfig, PoolLoad, Task, TaskArgs, TaskContext, TaskError, TaskFn, TaskSpec,
    WorkerId, WorkerPool,
};
use tokio::sync::Semaphore;

fn pool(capacity: usize) -> WorkerPool {
    WorkerPool::new(PoolConfig::with_capacity(capacity)).expect("pool")
}

#[tokio::test]
async fn second_task_waits_for_first_finished() {
    let pool = pool(1);
    let log = new_log();
    let gate = Arc::new(Semaphore::new(0));

    let a = pool.submit(TaskSpec::new(gated("A", "A-done", &gate)), recorder(&log));
    let b = pool.submit(TaskSpec::new(instant("B", "B-done")), recorder(&log));

    assert_eq!(a.state(), JobState::Running(WorkerId(0)));
    assert_eq!(b.state(), JobState::Queued);
    assert_eq!(pool.load(), PoolLoad { active: 1, pending: 1, capacity: 1 });

    gate.add_permits(1);
    assert_eq!(within(b.finished()).await, Some(Outcome::Success(json!("B-done"))));
    assert!(a.is_finished());

    assert_eq!(
        entries(&log),
        vec![
            "A:started:worker-0",
            "A:succeeded:\"A-done\"",
            "A:finished:worker-0",
            "B:started:worker-0",
            "B:succeeded:\"B-done\"",
            "B:finished:worker-0",
        ]
    );
    assert_eq!(pool.active_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failing_task_is_contained() {
    let pool = pool(2);
    let boom_log = new_log();
    let ok_log = new_log();

    let boom = pool.submit(TaskSpec::new(failing("boom", "boom")), recorder(&boom_log));
    let ok = pool.submit(TaskSpec::new(instant("ok", "fine")), recorder(&ok_log));

    let outcome = within(boom.finished()).await.expect("outcome");
    within(ok.finished()).await;

    let Outcome::Failure(fault) = outcome else {
        panic!("expected failure, got {outcome:?}");
    };
    assert_eq!(fault.kind, "task_failed");
    assert_eq!(fault.message, "boom");
    assert!(!fault.trace.is_empty());

    let boom_events = entries(&boom_log);
    assert_eq!(boom_events.len(), 3);
    let worker = boom_events[0].strip_prefix("boom:started:").expect("started first");
    assert_eq!(boom_events[1], "boom:failed:boom");
    assert_eq!(boom_events[2], format!("boom:finished:{worker}"));

    let ok_events = entries(&ok_log);
    assert_eq!(ok_events.len(), 3);
    assert_eq!(ok_events[1], "ok:succeeded:\"fine\"");

    assert_eq!(pool.active_count(), 0);
}

#[tokio::test]
async fn panicking_body_does_not_poison_pool() {
    let pool = pool(1);
    let task = TaskFn::arc("explodes", |_ctx: TaskContext| async move {
        if true {
            panic!("kaboom");
        }
        Ok::<_, TaskError>(json!(null))
    });

    let first = pool.submit(TaskSpec::new(task), CallbackSet::new());
    match within(first.finished()).await {
        Some(Outcome::Failure(fault)) => {
            assert_eq!(fault.kind, PANIC_LABEL);
            assert_eq!(fault.message, "kaboom");
        }
        other => panic!("expected panic fault, got {other:?}"),
    }

    let second = pool.submit(TaskSpec::new(instant("after", "ok")), CallbackSet::new());
    assert_eq!(within(second.finished()).await, Some(Outcome::Success(json!("ok"))));
}

/// `run` panics before it hands back a future.
struct PanicsBeforeFuture;

impl Task for PanicsBeforeFuture {
    fn name(&self) -> &str {
        "eager"
    }

    fn run<'life0, 'async_trait>(
        &'life0 self,
        _ctx: TaskContext,
    ) -> Pin<Box<dyn Future<Output = Result<Value, TaskError>> + Send + 'async_trait>>
    where
        'life0: 'async_trait,
        Self: 'async_trait,
    {
        panic!("no future for you")
    }
}

#[tokio::test]
async fn panic_while_building_future_releases_slot() {
    let pool = pool(1);
    let log = new_log();

    let eager = pool.submit(TaskSpec::new(Arc::new(PanicsBeforeFuture)), recorder(&log));
    let after = pool.submit(TaskSpec::new(instant("after", "ok")), recorder(&log));

    match within(eager.finished()).await {
        Some(Outcome::Failure(fault)) => {
            assert_eq!(fault.kind, PANIC_LABEL);
            assert_eq!(fault.message, "no future for you");
        }
        other => panic!("expected panic fault, got {other:?}"),
    }
    assert_eq!(within(after.finished()).await, Some(Outcome::Success(json!("ok"))));
    within(pool.wait_idle()).await;
    assert_eq!(pool.active_count(), 0);

    assert_eq!(
        entries(&log),
        vec![
            "eager:started:worker-0",
            "eager:failed:no future for you",
            "eager:finished:worker-0",
            "after:started:worker-0",
            "after:succeeded:\"ok\"",
            "after:finished:worker-0",
        ]
    );
}

#[tokio::test]
async fn exactly_capacity_tasks_start_rest_queue() {
    let pool = pool(3);
    let gate = Arc::new(Semaphore::new(0));
    let handles: Vec<_> = (0..12)
        .map(|_| pool.submit(TaskSpec::new(gated("held", "ok", &gate)), CallbackSet::new()))
        .collect();

    assert_eq!(pool.load(), PoolLoad { active: 3, pending: 9, capacity: 3 });
    for (i, h) in handles.iter().enumerate() {
        match i {
            0..3 => assert_eq!(h.state(), JobState::Running(WorkerId(i))),
            _ => assert_eq!(h.state(), JobState::Queued),
        }
    }

    gate.add_permits(12);
    within(pool.wait_idle()).await;
    for h in &handles {
        assert_eq!(h.finished().await, Some(Outcome::Success(json!("ok"))));
    }
}

#[tokio::test]
async fn each_finish_promotes_one_queued_task_in_order() {
    const TASKS: usize = 6;
    let pool = pool(2);
    let log = new_log();
    let gates: Vec<_> = (0..TASKS).map(|_| Arc::new(Semaphore::new(0))).collect();
    let handles: Vec<_> = gates
        .iter()
        .enumerate()
        .map(|(i, gate)| pool.submit(TaskSpec::new(gated(format!("t{i}"), "ok", gate)), recorder(&log)))
        .collect();
    assert_eq!(pool.load(), PoolLoad { active: 2, pending: 4, capacity: 2 });

    for i in 0..TASKS {
        gates[i].add_permits(1);
        within(handles[i].finished()).await;

        let running = (i + 1..TASKS.min(i + 3)).collect::<Vec<_>>();
        let queued = (TASKS.min(i + 3)..TASKS).collect::<Vec<_>>();
        for &r in &running {
            assert!(matches!(handles[r].state(), JobState::Running(_)), "t{r} should run");
        }
        for &q in &queued {
            assert_eq!(handles[q].state(), JobState::Queued, "t{q} should wait");
        }
        assert_eq!(pool.load(), PoolLoad { active: running.len(), pending: queued.len(), capacity: 2 });
    }

    let starts: Vec<String> = entries(&log)
        .into_iter()
        .filter(|line| line.contains(":started:"))
        .map(|line| line.split(':').next().unwrap_or_default().to_string())
        .collect();
    assert_eq!(starts, vec!["t0", "t1", "t2", "t3", "t4", "t5"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn active_count_never_exceeds_capacity() {
    const CAPACITY: usize = 3;
    let pool = pool(CAPACITY);
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let overflow = Arc::new(AtomicBool::new(false));

    let task = {
        let (running, peak) = (Arc::clone(&running), Arc::clone(&peak));
        TaskFn::arc("busy", move |_ctx: TaskContext| {
            let (running, peak) = (Arc::clone(&running), Arc::clone(&peak));
            async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, TaskError>(json!(now))
            }
        })
    };

    let callbacks = {
        let (pool, overflow) = (pool.clone(), Arc::clone(&overflow));
        CallbackSet::new().on(EventKind::Started, move |_: &Event| {
            if pool.active_count() > CAPACITY {
                overflow.store(true, Ordering::SeqCst);
            }
        })
    };

    let handles: Vec<_> = (0..12)
        .map(|_| pool.submit(TaskSpec::new(task.clone()), callbacks.clone()))
        .collect();
    assert!(pool.active_count() <= CAPACITY);

    within(pool.wait_idle()).await;
    for h in &handles {
        assert!(h.finished().await.is_some_and(|o| o.is_success()));
    }
    assert!(peak.load(Ordering::SeqCst) <= CAPACITY);
    assert!(!overflow.load(Ordering::SeqCst));
    assert!(pool.load().is_idle());
}

#[tokio::test]
async fn queued_tasks_start_in_submission_order() {
    let pool = pool(1);
    let log = new_log();
    let mut bus = pool.subscribe();
    let gate = Arc::new(Semaphore::new(0));

    pool.submit(TaskSpec::new(gated("head", "done", &gate)), recorder(&log));
    let mut last = None;
    for i in 1..=5 {
        let task = TaskFn::arc(format!("t{i}"), move |_ctx: TaskContext| async move {
            Ok::<_, TaskError>(json!(i))
        });
        last = Some(pool.submit(TaskSpec::new(task), recorder(&log)));
    }
    assert_eq!(pool.pending_count(), 5);

    let mut positions = Vec::new();
    while positions.len() < 5 {
        if let Notification::Queued { position, .. } = within(bus.recv()).await.expect("bus") {
            positions.push(position);
        }
    }
    assert_eq!(positions, vec![1, 2, 3, 4, 5]);

    gate.add_permits(1);
    within(last.expect("submitted").finished()).await;

    let starts: Vec<String> = entries(&log)
        .into_iter()
        .filter(|line| line.contains(":started:"))
        .collect();
    assert_eq!(
        starts,
        vec![
            "head:started:worker-0",
            "t1:started:worker-0",
            "t2:started:worker-0",
            "t3:started:worker-0",
            "t4:started:worker-0",
            "t5:started:worker-0",
        ]
    );
}

#[tokio::test]
async fn raising_capacity_promotes_queued_tasks() {
    let pool = pool(1);
    let gate = Arc::new(Semaphore::new(0));
    let handles: Vec<_> = (0..4)
        .map(|_| pool.submit(TaskSpec::new(gated("slow", "ok", &gate)), CallbackSet::new()))
        .collect();
    assert_eq!(pool.load(), PoolLoad { active: 1, pending: 3, capacity: 1 });

    pool.configure(3).unwrap();
    assert_eq!(pool.load(), PoolLoad { active: 3, pending: 1, capacity: 3 });
    assert_eq!(handles[1].state(), JobState::Running(WorkerId(1)));
    assert_eq!(handles[2].state(), JobState::Running(WorkerId(2)));
    assert_eq!(handles[3].state(), JobState::Queued);

    gate.add_permits(4);
    within(pool.wait_idle()).await;
    for h in &handles {
        assert_eq!(h.finished().await, Some(Outcome::Success(json!("ok"))));
    }
}

#[tokio::test]
async fn lowering_capacity_never_evicts() {
    let pool = pool(3);
    let gates: Vec<_> = (0..4).map(|_| Arc::new(Semaphore::new(0))).collect();
    let spawn = |i: usize| pool.submit(TaskSpec::new(gated("held", "ok", &gates[i])), CallbackSet::new());

    let running: Vec<_> = (0..3).map(|i| spawn(i)).collect();
    pool.configure(1).unwrap();
    assert_eq!(pool.active_count(), 3);
    assert_eq!(pool.capacity(), 1);

    let queued = spawn(3);
    assert_eq!(queued.state(), JobState::Queued);

    gates[0].add_permits(1);
    within(running[0].finished()).await;
    assert_eq!(pool.load(), PoolLoad { active: 2, pending: 1, capacity: 1 });

    gates[1].add_permits(1);
    within(running[1].finished()).await;
    assert_eq!(pool.load(), PoolLoad { active: 1, pending: 1, capacity: 1 });

    gates[2].add_permits(1);
    within(running[2].finished()).await;
    assert!(matches!(queued.state(), JobState::Running(_)));
    assert_eq!(pool.pending_count(), 0);

    gates[3].add_permits(1);
    assert_eq!(within(queued.finished()).await, Some(Outcome::Success(json!("ok"))));
    assert_eq!(pool.active_count(), 0);
}

#[tokio::test]
async fn zero_capacity_is_rejected() {
    let pool = pool(2);
    assert_eq!(pool.configure(0), Err(DispatchError::ZeroCapacity));
    assert_eq!(pool.capacity(), 2);
}

#[tokio::test]
async fn bus_carries_lifecycle_in_order() {
    let pool = pool(2);
    let mut bus = pool.subscribe();
    let handle = pool.submit(TaskSpec::new(instant("bus", "x")), CallbackSet::new());

    let mut seen = Vec::new();
    while seen.len() < 3 {
        if let Notification::Lifecycle(ev) = within(bus.recv()).await.expect("bus") {
            assert_eq!(ev.job, handle.id());
            seen.push(ev);
        }
    }
    let kinds: Vec<_> = seen.iter().map(|ev| ev.kind()).collect();
    assert_eq!(kinds, vec![EventKind::Started, EventKind::Succeeded, EventKind::Finished]);
    assert!(seen.windows(2).all(|w| w[0].seq < w[1].seq));
    assert_eq!(seen[0].worker(), seen[2].worker());
    assert_eq!(seen[1].value(), Some(&json!("x")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn blocking_task_receives_bound_args() {
    let pool = pool(2);
    let repeat = BlockingFn::arc("repeat", |ctx: TaskContext| -> Result<serde_json::Value, TaskError> {
        let word = ctx.args.require_str(0)?;
        let times = ctx
            .args
            .get_named("times")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| TaskError::invalid_args("times must be an integer"))?;
        std::thread::sleep(Duration::from_millis(5));
        Ok(json!(word.repeat(times as usize)))
    });
    let spec = TaskSpec::new(repeat).with_args(TaskArgs::new().arg("ab").kwarg("times", 3));

    let handle = pool.submit(spec, CallbackSet::new());
    assert_eq!(within(handle.finished()).await, Some(Outcome::Success(json!("ababab"))));
}

#[test]
fn build_requires_runtime_unless_given_one() {
    assert_eq!(
        WorkerPool::new(PoolConfig::with_capacity(1)).err(),
        Some(DispatchError::NoRuntime)
    );

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap();
    let pool = WorkerPool::builder(PoolConfig::with_capacity(1))
        .with_runtime(rt.handle().clone())
        .build()
        .unwrap();

    // Submitting from a thread outside the runtime.
    let handle = pool.submit(TaskSpec::new(instant("outside", "ok")), CallbackSet::new());
    let outcome = rt.block_on(async { within(handle.finished()).await });
    assert_eq!(outcome, Some(Outcome::Success(json!("ok"))));
}
