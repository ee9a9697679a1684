mod common;

use std::time::Duration;

use ticketd_core::{ErrorKind, ResolveError, Resolver, ResolverConfig, Source, TierPolicy};
use ticketd_db_memory::InMemoryStore;

use common::{CountingStore, UnreachableStore, assert_elapsed};

fn memory_resolver(config: ResolverConfig) -> Resolver {
    Resolver::new(
        Box::new(InMemoryStore::new()),
        Box::new(InMemoryStore::new()),
        config,
    )
}

#[tokio::test(start_paused = true)]
async fn first_resolution_computes_and_second_reuses_ticket() {
    let resolver = memory_resolver(ResolverConfig::default());

    let first = resolver.resolve("alice").await.expect("first resolution");
    assert_eq!(first.source, Source::Compute);
    assert_eq!(first.ticket.as_str(), "1");

    let second = resolver.resolve("alice").await.expect("second resolution");
    assert_ne!(second.source, Source::Compute);
    assert_eq!(second.ticket, first.ticket);

    // The computed ticket landed in the durable store
    assert_eq!(
        resolver.store().read("alice").await.unwrap(),
        Some(first.ticket.clone())
    );
    assert_eq!(resolver.stats().tickets_issued, 1);
}

#[tokio::test(start_paused = true)]
async fn computed_ticket_is_promoted_to_cache_by_default() {
    let resolver = memory_resolver(ResolverConfig::default());

    resolver.resolve("alice").await.unwrap();
    let again = resolver.resolve("alice").await.unwrap();
    assert_eq!(again.source, Source::Cache);
}

#[tokio::test(start_paused = true)]
async fn without_promotion_second_hit_comes_from_store_then_cache() {
    let resolver = memory_resolver(ResolverConfig {
        promote_computed_to_cache: false,
        ..ResolverConfig::default()
    });

    let first = resolver.resolve("alice").await.unwrap();
    assert_eq!(first.source, Source::Compute);
    assert_eq!(resolver.cache().read("alice").await.unwrap(), None);

    let second = resolver.resolve("alice").await.unwrap();
    assert_eq!(second.source, Source::Store);
    assert_eq!(second.ticket, first.ticket);

    // The store hit was written back into the cache
    let third = resolver.resolve("alice").await.unwrap();
    assert_eq!(third.source, Source::Cache);
    assert_eq!(third.ticket, first.ticket);
}

#[tokio::test(start_paused = true)]
async fn tickets_differ_across_identities() {
    let resolver = memory_resolver(ResolverConfig::default());

    let alice = resolver.resolve("alice").await.unwrap();
    let bob = resolver.resolve("bob").await.unwrap();
    assert_eq!(alice.ticket.as_str(), "1");
    assert_eq!(bob.ticket.as_str(), "2");
}

#[tokio::test(start_paused = true)]
async fn not_found_identities_touch_no_tier() {
    let (cache, cache_calls) = CountingStore::new();
    let (store, store_calls) = CountingStore::new();
    let resolver = Resolver::new(Box::new(cache), Box::new(store), ResolverConfig::default());
    let before = resolver.stats();

    for identity in ["", "errorc"] {
        let err = resolver.resolve(identity).await.unwrap_err();
        assert!(matches!(err, ResolveError::NotFound { .. }));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.status_code(), 404);
    }

    assert_eq!(cache_calls.total(), 0);
    assert_eq!(store_calls.total(), 0);
    assert_eq!(resolver.stats(), before);
    assert_eq!(resolver.stats().cache.in_flight, 0);
    assert_eq!(resolver.stats().store.in_flight, 0);
    assert_eq!(resolver.stats().compute.in_flight, 0);
}

#[tokio::test(start_paused = true)]
async fn fault_sentinel_touches_no_tier() {
    let (cache, cache_calls) = CountingStore::new();
    let (store, store_calls) = CountingStore::new();
    let resolver = Resolver::new(Box::new(cache), Box::new(store), ResolverConfig::default());

    let err = resolver.resolve("errors").await.unwrap_err();
    assert!(matches!(err, ResolveError::InjectedFault { .. }));
    assert_eq!(err.kind(), ErrorKind::InternalFault);
    assert_eq!(err.status_code(), 500);

    assert_eq!(cache_calls.total(), 0);
    assert_eq!(store_calls.total(), 0);
    let stats = resolver.stats();
    assert_eq!(stats.cache.entered, 0);
    assert_eq!(stats.store.entered, 0);
    assert_eq!(stats.compute.entered, 0);
    assert_eq!(stats.tickets_issued, 0);
}

#[tokio::test(start_paused = true)]
async fn unreachable_cache_falls_through_and_is_not_reported() {
    let (store, store_calls) = CountingStore::new();
    let resolver = Resolver::new(
        Box::new(UnreachableStore),
        Box::new(store),
        ResolverConfig::default(),
    );

    let first = resolver.resolve("alice").await.unwrap();
    assert_eq!(first.source, Source::Compute);

    let second = resolver.resolve("alice").await.unwrap();
    assert_eq!(second.source, Source::Store);
    assert_eq!(second.ticket, first.ticket);
    // read + write on the first call, read on the second
    assert_eq!(store_calls.gets(), 2);
    assert_eq!(store_calls.puts(), 1);

    // Every failed cache operation released its slot
    let stats = resolver.stats();
    assert_eq!(stats.cache.entered, 4);
    assert_eq!(stats.cache.in_flight, 0);
    assert_eq!(stats.cache.rejected, 0);
    assert_eq!(stats.store.in_flight, 0);
}

#[tokio::test(start_paused = true)]
async fn unreachable_store_still_resolves_via_compute() {
    let resolver = Resolver::new(
        Box::new(InMemoryStore::new()),
        Box::new(UnreachableStore),
        ResolverConfig::default(),
    );

    let first = resolver.resolve("alice").await.unwrap();
    assert_eq!(first.source, Source::Compute);

    // The durable write failed, but the cache promotion did not
    let second = resolver.resolve("alice").await.unwrap();
    assert_eq!(second.source, Source::Cache);
    assert_eq!(second.ticket, first.ticket);

    // Failed read and failed write-back
    let stats = resolver.stats();
    assert_eq!(stats.store.entered, 2);
    assert_eq!(stats.store.in_flight, 0);
    assert_eq!(stats.cache.in_flight, 0);
}

#[tokio::test(start_paused = true)]
async fn overloaded_cache_is_demoted_to_fallthrough() {
    let resolver = Resolver::new(
        Box::new(InMemoryStore::new()),
        Box::new(InMemoryStore::with_entries([("alice", "beef")])),
        ResolverConfig {
            // Every cache request is rejected: one in flight already exceeds the ceiling
            cache: TierPolicy::new(Duration::from_millis(200), Duration::from_millis(100)),
            ..ResolverConfig::default()
        },
    );

    let resolved = resolver.resolve("alice").await.unwrap();
    assert_eq!(resolved.source, Source::Store);
    assert_eq!(resolved.ticket.as_str(), "beef");

    // Both the read and the write-back were rejected
    let cache = resolver.stats().cache;
    assert_eq!(cache.entered, 2);
    assert_eq!(cache.rejected, 2);
    assert_eq!(cache.in_flight, 0);
}

#[tokio::test(start_paused = true)]
async fn overloaded_compute_is_an_internal_fault() {
    let resolver = memory_resolver(ResolverConfig {
        compute: TierPolicy::new(Duration::from_millis(1000), Duration::from_millis(500)),
        ..ResolverConfig::default()
    });

    let err = resolver.resolve("alice").await.unwrap_err();
    assert_eq!(err.status_code(), 500);
    match err {
        ResolveError::Exhausted(cause) => assert!(cause.is_overloaded()),
        other => panic!("expected Exhausted, got {other:?}"),
    }

    // Nothing was persisted for the failed identity
    assert_eq!(resolver.store().read("alice").await.unwrap(), None);
    assert_eq!(resolver.stats().tickets_issued, 0);
}

#[tokio::test(start_paused = true)]
async fn resolution_latency_sums_tier_delays() {
    let resolver = memory_resolver(ResolverConfig::default());

    let start = tokio::time::Instant::now();
    resolver.resolve("alice").await.unwrap();
    // cache read + store read + compute + store write + cache write
    assert_elapsed(start, Duration::from_millis(200 + 200 + 1000 + 200 + 200));

    let start = tokio::time::Instant::now();
    resolver.resolve("alice").await.unwrap();
    assert_elapsed(start, Duration::from_millis(200));
}
