//! Integration tests for core-async on the tokio runtime.

use core_async::sync::CancellationToken;
use core_async::{sync, task, time};
use std::sync::Arc;

#[core_async::test]
async fn test_task_spawn() {
    let handle = task::spawn(async { 42 });
    assert_eq!(handle.await.unwrap(), 42);
}

#[core_async::test]
async fn test_timeout_success() {
    let result = time::timeout(time::Duration::from_millis(100), async {
        time::sleep(time::Duration::from_millis(5)).await;
        42
    })
    .await;

    assert_eq!(result.unwrap(), 42);
}

#[core_async::test]
async fn test_timeout_failure() {
    let result = time::timeout(time::Duration::from_millis(10), async {
        time::sleep(time::Duration::from_millis(200)).await;
        42
    })
    .await;

    assert!(result.is_err());
}

#[core_async::test]
async fn test_cancellation_token_aborts_select() {
    let token = CancellationToken::new();
    let child = token.child_token();

    let handle = task::spawn(async move {
        core_async::select! {
            biased;
            _ = child.cancelled() => "cancelled",
            _ = time::sleep(time::Duration::from_secs(10)) => "finished",
        }
    });

    time::sleep(time::Duration::from_millis(5)).await;
    token.cancel();

    assert_eq!(handle.await.unwrap(), "cancelled");
}

#[core_async::test]
async fn test_cancellation_token_is_sticky() {
    let token = CancellationToken::new();
    token.cancel();

    // A token cancelled before anyone waits still resolves immediately.
    time::timeout(time::Duration::from_millis(50), token.cancelled())
        .await
        .expect("cancelled() should resolve");
    assert!(token.is_cancelled());
}

#[core_async::test]
async fn test_mutex() {
    let mutex = Arc::new(sync::Mutex::new(0));
    let mutex_clone = mutex.clone();

    task::spawn(async move {
        *mutex_clone.lock().await += 1;
    })
    .await
    .unwrap();

    assert_eq!(*mutex.lock().await, 1);
}

#[core_async::test]
async fn test_broadcast_channel() {
    let (tx, mut rx1) = sync::broadcast::channel(10);
    let mut rx2 = tx.subscribe();

    task::spawn(async move {
        for i in 0..5 {
            tx.send(i).unwrap();
        }
    });

    let mut values1 = vec![];
    let mut values2 = vec![];

    for _ in 0..5 {
        values1.push(rx1.recv().await.unwrap());
        values2.push(rx2.recv().await.unwrap());
    }

    assert_eq!(values1, vec![0, 1, 2, 3, 4]);
    assert_eq!(values2, vec![0, 1, 2, 3, 4]);
}

#[core_async::test]
async fn test_interval() {
    let mut interval = time::interval(time::Duration::from_millis(10));
    let start = time::Instant::now();

    // First tick is immediate
    interval.tick().await;
    for _ in 0..3 {
        interval.tick().await;
    }

    assert!(start.elapsed() >= time::Duration::from_millis(30));
}

#[test]
fn test_block_on_outside_runtime() {
    assert!(!core_async::runtime::in_runtime());
    let value = core_async::runtime::block_on(async { core_async::runtime::in_runtime() });
    assert!(value);
}

#[test]
fn test_now_millis() {
    assert!(time::now_millis() > 0);
}
