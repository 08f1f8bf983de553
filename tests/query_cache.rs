//! Behavioral tests for the query cache: deduplication, freshness,
//! invalidation, retry backoff, and subscription-driven eviction.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use oflp::error::ApiError;
use oflp::provider::{FilterSet, PageRequest};
use oflp::query::{keys, FetchOptions, QueryClient, QueryEvent, QueryStatus};

fn counting_loader(
    calls: Arc<AtomicUsize>,
    value: u32,
    delay: Duration,
) -> impl Fn() -> futures::future::BoxFuture<'static, Result<u32, ApiError>> + Send + Sync + 'static
{
    move || {
        calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Ok(value)
        })
    }
}

#[tokio::test(start_paused = true)]
async fn concurrent_fetches_share_one_load() {
    let client = QueryClient::default();
    let key = keys::detail("shipments", "1");
    let calls = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let client = client.clone();
        let key = key.clone();
        let loader = counting_loader(calls.clone(), 42, Duration::from_millis(100));
        handles.push(tokio::spawn(async move {
            client.fetch(key, loader, FetchOptions::new()).await
        }));
    }

    for handle in handles {
        let value = handle.await.unwrap().unwrap();
        assert_eq!(*value, 42);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn fresh_entry_is_never_refetched() {
    let client = QueryClient::default();
    let key = keys::detail("shipments", "1");
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..5 {
        let loader = counting_loader(calls.clone(), 7, Duration::ZERO);
        let value = client
            .fetch(key.clone(), loader, FetchOptions::new())
            .await
            .unwrap();
        assert_eq!(*value, 7);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn freshness_window_expiry_triggers_refetch() {
    let client = QueryClient::default();
    let key = keys::all("health");
    let calls = Arc::new(AtomicUsize::new(0));
    let options = || FetchOptions::new().fresh_for(Duration::from_secs(30));

    let loader = counting_loader(calls.clone(), 1, Duration::ZERO);
    client.fetch(key.clone(), loader, options()).await.unwrap();

    tokio::time::sleep(Duration::from_secs(31)).await;

    let loader = counting_loader(calls.clone(), 1, Duration::ZERO);
    client.fetch(key.clone(), loader, options()).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn invalidation_bypasses_freshness() {
    let client = QueryClient::default();
    let key = keys::list("shipments", &FilterSet::new(), &PageRequest::new());
    let calls = Arc::new(AtomicUsize::new(0));

    let loader = counting_loader(calls.clone(), 3, Duration::ZERO);
    client
        .fetch(key.clone(), loader, FetchOptions::new())
        .await
        .unwrap();

    assert_eq!(client.invalidate(&keys::lists("shipments")), 1);

    let loader = counting_loader(calls.clone(), 3, Duration::ZERO);
    client
        .fetch(key.clone(), loader, FetchOptions::new())
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn transient_failures_retry_with_backoff() {
    let client = QueryClient::default();
    let key = keys::all("health");
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let started = tokio::time::Instant::now();

    let result = client
        .fetch::<u32, _, _>(
            key,
            move || -> futures::future::BoxFuture<'static, Result<u32, ApiError>> {
                counter.fetch_add(1, Ordering::SeqCst);
                Box::pin(async { Err(ApiError::network("connection refused")) })
            },
            FetchOptions::new(),
        )
        .await;

    assert!(result.is_err());
    // Initial attempt plus three retries.
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    // Backoff delays of 1s, 2s and 4s between attempts.
    assert_eq!(started.elapsed(), Duration::from_secs(7));
}

#[tokio::test]
async fn client_errors_are_terminal() {
    let client = QueryClient::default();
    let key = keys::detail("shipments", "missing");
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let result = client
        .fetch::<u32, _, _>(
            key,
            move || -> futures::future::BoxFuture<'static, Result<u32, ApiError>> {
                counter.fetch_add(1, Ordering::SeqCst);
                Box::pin(async { Err(ApiError::not_found("Shipment missing")) })
            },
            FetchOptions::new(),
        )
        .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn recovery_after_transient_failures() {
    let client = QueryClient::default();
    let key = keys::detail("ports", "port-1");
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let value = client
        .fetch(
            key,
            move || -> futures::future::BoxFuture<'static, Result<u32, ApiError>> {
                let attempt = counter.fetch_add(1, Ordering::SeqCst);
                Box::pin(async move {
                    if attempt < 2 {
                        Err(ApiError::http(503, "Service unavailable"))
                    } else {
                        Ok(99u32)
                    }
                })
            },
            FetchOptions::new(),
        )
        .await
        .unwrap();

    assert_eq!(*value, 99);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn fetch_only_entry_evicted_after_inactivity() {
    let client = QueryClient::default();
    let key = keys::list("shipments", &FilterSet::new(), &PageRequest::new());

    // No subscription; the entry's own inactivity clock must collect it.
    let loader = counting_loader(Arc::new(AtomicUsize::new(0)), 1, Duration::ZERO);
    client
        .fetch(
            key.clone(),
            loader,
            FetchOptions::new().retain_for(Duration::from_secs(60)),
        )
        .await
        .unwrap();
    assert!(client.contains(&key));

    tokio::time::sleep(Duration::from_secs(3600)).await;

    assert!(!client.contains(&key));
}

#[tokio::test(start_paused = true)]
async fn cache_read_restarts_inactivity_window() {
    let client = QueryClient::default();
    let key = keys::detail("ports", "port-1");
    let calls = Arc::new(AtomicUsize::new(0));
    let options = || {
        FetchOptions::new()
            .retain_for(Duration::from_secs(60))
            .fresh_for(Duration::from_secs(600))
    };

    let loader = counting_loader(calls.clone(), 2, Duration::ZERO);
    client.fetch(key.clone(), loader, options()).await.unwrap();

    // A cache hit 45s in counts as activity.
    tokio::time::sleep(Duration::from_secs(45)).await;
    let loader = counting_loader(calls.clone(), 2, Duration::ZERO);
    client.fetch(key.clone(), loader, options()).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // 90s after the first fetch but only 45s after the last read.
    tokio::time::sleep(Duration::from_secs(45)).await;
    assert!(client.contains(&key));

    // 75s of silence finally evicts it.
    tokio::time::sleep(Duration::from_secs(75)).await;
    assert!(!client.contains(&key));
}

#[tokio::test(start_paused = true)]
async fn abandoned_caller_does_not_abort_the_load() {
    let client = QueryClient::default();
    let key = keys::detail("shipments", "1");
    let calls = Arc::new(AtomicUsize::new(0));
    let loader = counting_loader(calls.clone(), 9, Duration::from_secs(5));

    // Give up on the fetch while the load is still in flight.
    let abandoned = tokio::time::timeout(
        Duration::from_secs(1),
        client.fetch(key.clone(), loader, FetchOptions::new()),
    )
    .await;
    assert!(abandoned.is_err());

    // The load still runs to completion and its result lands.
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(client.status(&key), Some(QueryStatus::Success));
    assert_eq!(client.get::<u32>(&key).as_deref(), Some(&9));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn entry_evicted_after_inactivity_window() {
    let client = QueryClient::default();
    let key = keys::detail("shipments", "1");
    let retain = Duration::from_secs(60);

    let sub = client.subscribe(&key);
    let loader = counting_loader(Arc::new(AtomicUsize::new(0)), 5, Duration::ZERO);
    client
        .fetch(key.clone(), loader, FetchOptions::new().retain_for(retain))
        .await
        .unwrap();
    assert!(client.contains(&key));

    drop(sub);
    tokio::time::sleep(retain + Duration::from_secs(1)).await;

    assert!(!client.contains(&key));
}

#[tokio::test(start_paused = true)]
async fn resubscribe_cancels_pending_eviction() {
    let client = QueryClient::default();
    let key = keys::detail("shipments", "1");
    let retain = Duration::from_secs(60);
    let calls = Arc::new(AtomicUsize::new(0));
    let options = || {
        FetchOptions::new()
            .retain_for(retain)
            .fresh_for(Duration::from_secs(600))
    };

    let sub = client.subscribe(&key);
    let loader = counting_loader(calls.clone(), 5, Duration::ZERO);
    client.fetch(key.clone(), loader, options()).await.unwrap();

    drop(sub);
    tokio::time::sleep(Duration::from_secs(30)).await;

    // Coming back within the window keeps the entry alive past it.
    let _sub = client.subscribe(&key);
    tokio::time::sleep(retain).await;

    assert!(client.contains(&key));

    // The cached value is still served without a new load.
    let loader = counting_loader(calls.clone(), 5, Duration::ZERO);
    let value = client.fetch(key.clone(), loader, options()).await.unwrap();
    assert_eq!(*value, 5);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn subscribers_see_updates_and_invalidations() {
    let client = QueryClient::default();
    let prefix = keys::lists("shipments");
    let key = keys::list("shipments", &FilterSet::new(), &PageRequest::new());

    let mut sub = client.subscribe(&prefix);

    let loader = counting_loader(Arc::new(AtomicUsize::new(0)), 11, Duration::ZERO);
    client
        .fetch(key.clone(), loader, FetchOptions::new())
        .await
        .unwrap();

    match sub.next_event().await {
        Some(QueryEvent::Updated { key: updated }) => assert_eq!(updated, key),
        other => panic!("expected an update event, got {:?}", other),
    }

    client.invalidate(&prefix);
    match sub.next_event().await {
        Some(QueryEvent::Invalidated { key: invalidated }) => {
            assert!(invalidated.starts_with(&prefix));
        }
        other => panic!("expected an invalidation event, got {:?}", other),
    }
}
