#![allow(dead_code)]

use std::borrow::Cow;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use taskagent::{
    CallbackSet, Event, EventKind, LifecycleEvent, TaskContext, TaskError, TaskFn, TaskRef,
};
use tokio::sync::Semaphore;

pub type Log = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// One line per event: `task:kind[:payload]`.
pub fn describe(ev: &Event) -> String {
    match &ev.lifecycle {
        LifecycleEvent::Started(w) => format!("{}:started:{w}", ev.task),
        LifecycleEvent::Succeeded(v) => format!("{}:succeeded:{v}", ev.task),
        LifecycleEvent::Failed(f) => format!("{}:failed:{}", ev.task, f.message),
        LifecycleEvent::Finished(w) => format!("{}:finished:{w}", ev.task),
    }
}

/// Callbacks for every kind that append [`describe`] lines to `log`.
pub fn recorder(log: &Log) -> CallbackSet {
    let mut set = CallbackSet::new();
    for kind in EventKind::ALL {
        let log = Arc::clone(log);
        set = set.on(kind, move |ev: &Event| log.lock().unwrap().push(describe(ev)));
    }
    set
}

/// Task that returns `value` right away.
pub fn instant(name: &'static str, value: &'static str) -> TaskRef {
    TaskFn::arc(name, move |_ctx: TaskContext| async move { Ok::<_, TaskError>(json!(value)) })
}

/// Task that takes one permit from `gate` before returning `value`.
pub fn gated(
    name: impl Into<Cow<'static, str>>,
    value: &'static str,
    gate: &Arc<Semaphore>,
) -> TaskRef {
    let gate = Arc::clone(gate);
    TaskFn::arc(name, move |_ctx: TaskContext| {
        let gate = Arc::clone(&gate);
        async move {
            gate.acquire().await.expect("gate closed").forget();
            Ok::<_, TaskError>(json!(value))
        }
    })
}

/// Task that fails with `reason`.
pub fn failing(name: &'static str, reason: &'static str) -> TaskRef {
    TaskFn::arc(name, move |_ctx: TaskContext| async move {
        Err::<serde_json::Value, _>(TaskError::fail(reason))
    })
}

pub async fn within<F: Future>(fut: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(5), fut)
        .await
        .expect("timed out")
}
