//! End-to-end follow counter behavior
//!
//! Exercises the full path: service writes an edge document, the store
//! publishes the change event, the runtime delivers it, and the trigger
//! moves both denormalized counters. `drain()` is the "eventually" fence.

use std::sync::{Arc, Barrier};
use std::thread;
use storyhive::{
    ChangeEvent, ChangeKind, DeliveryConfig, DocPath, Error, Storyhive, StoryhiveConfig, UserId,
};

fn uid(s: &str) -> UserId {
    UserId::new(s).unwrap()
}

fn hive_with_users(ids: &[&str]) -> Storyhive {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let hive = Storyhive::ephemeral();
    for id in ids {
        hive.create_user(&uid(id), id, &format!("{}@example.com", id))
            .unwrap();
    }
    hive
}

#[test]
fn single_follow_moves_both_counters_by_one() {
    let hive = hive_with_users(&["author", "fan"]);

    hive.follows().follow(&uid("fan"), &uid("author")).unwrap();
    hive.drain();

    assert_eq!(hive.follows().stats(&uid("author")).unwrap().followers_count, 1);
    assert_eq!(hive.follows().stats(&uid("author")).unwrap().following_count, 0);
    assert_eq!(hive.follows().stats(&uid("fan")).unwrap().following_count, 1);
    assert_eq!(hive.follows().stats(&uid("fan")).unwrap().followers_count, 0);
    hive.shutdown();
}

#[test]
fn single_unfollow_restores_both_counters() {
    let hive = hive_with_users(&["author", "fan"]);

    hive.follows().follow(&uid("fan"), &uid("author")).unwrap();
    hive.drain();
    hive.follows().unfollow(&uid("fan"), &uid("author")).unwrap();
    hive.drain();

    assert_eq!(hive.follows().stats(&uid("author")).unwrap().followers_count, 0);
    assert_eq!(hive.follows().stats(&uid("fan")).unwrap().following_count, 0);
    hive.shutdown();
}

#[test]
fn refollow_without_unfollow_counts_once() {
    let hive = hive_with_users(&["author", "fan"]);

    assert!(hive.follows().follow(&uid("fan"), &uid("author")).unwrap());
    // Second write rewrites the edge document; no second creation event
    assert!(!hive.follows().follow(&uid("fan"), &uid("author")).unwrap());
    hive.drain();

    assert_eq!(hive.follows().stats(&uid("author")).unwrap().followers_count, 1);
    hive.shutdown();
}

#[test]
fn concurrent_distinct_followers_all_count() {
    let follower_count = 16;
    let ids: Vec<String> = (0..follower_count).map(|i| format!("fan{:02}", i)).collect();
    let mut all: Vec<&str> = ids.iter().map(String::as_str).collect();
    all.push("author");

    let hive = Arc::new(hive_with_users(&all));
    let barrier = Arc::new(Barrier::new(follower_count));

    let handles: Vec<_> = ids
        .iter()
        .map(|id| {
            let hive = Arc::clone(&hive);
            let barrier = Arc::clone(&barrier);
            let follower = uid(id);
            thread::spawn(move || {
                barrier.wait();
                hive.follows().follow(&follower, &uid("author")).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    hive.drain();

    let stats = hive.follows().stats(&uid("author")).unwrap();
    assert_eq!(stats.followers_count, follower_count as i64);
    for id in &ids {
        assert_eq!(hive.follows().stats(&uid(id)).unwrap().following_count, 1);
    }
    hive.shutdown();
}

#[test]
fn follow_then_unfollow_nets_to_zero_in_creation_order() {
    // Single worker forces the creation event to complete first
    let hive = Storyhive::open(
        StoryhiveConfig::new().with_delivery(DeliveryConfig::new().with_workers(1)),
    );
    hive.create_user(&uid("author"), "author", "au@example.com").unwrap();
    hive.create_user(&uid("fan"), "fan", "fan@example.com").unwrap();

    hive.follows().follow(&uid("fan"), &uid("author")).unwrap();
    hive.follows().unfollow(&uid("fan"), &uid("author")).unwrap();
    hive.drain();

    assert_eq!(hive.follows().stats(&uid("author")).unwrap().followers_count, 0);
    assert_eq!(hive.follows().stats(&uid("fan")).unwrap().following_count, 0);
    hive.shutdown();
}

#[test]
fn follow_then_unfollow_nets_to_zero_in_reversed_order() {
    // No ordering guarantee exists, so the deletion may be processed first:
    // counters dip to -1 and return to 0 once the creation lands. Hand the
    // runtime the two events in reversed order to pin that interleaving.
    let hive = Storyhive::open(
        StoryhiveConfig::new().with_delivery(DeliveryConfig::new().with_workers(1)),
    );
    hive.create_user(&uid("author"), "author", "au@example.com").unwrap();
    hive.create_user(&uid("fan"), "fan", "fan@example.com").unwrap();

    let edge = DocPath::parse("users/author/followers/fan").unwrap();
    hive.runtime()
        .deliver(ChangeEvent::new(edge.clone(), ChangeKind::Deleted))
        .unwrap();
    hive.runtime()
        .deliver(ChangeEvent::new(edge, ChangeKind::Created))
        .unwrap();
    hive.drain();

    assert_eq!(hive.follows().stats(&uid("author")).unwrap().followers_count, 0);
    assert_eq!(hive.follows().stats(&uid("fan")).unwrap().following_count, 0);
    hive.shutdown();
}

#[test]
fn self_follow_is_rejected_at_the_service() {
    let hive = hive_with_users(&["solo"]);
    let err = hive.follows().follow(&uid("solo"), &uid("solo")).unwrap_err();
    assert!(matches!(err, Error::InvalidOperation(_)));
    hive.drain();
    assert_eq!(hive.follows().stats(&uid("solo")).unwrap().followers_count, 0);
    hive.shutdown();
}

#[test]
fn self_follow_edge_injected_downstream_stays_isolated() {
    // If an edge slips past the upstream guard, the trigger must move the
    // two fields of the single document by exactly one each
    let hive = hive_with_users(&["solo"]);
    let edge = DocPath::parse("users/solo/followers/solo").unwrap();
    hive.runtime()
        .deliver(ChangeEvent::new(edge, ChangeKind::Created))
        .unwrap();
    hive.drain();

    let stats = hive.follows().stats(&uid("solo")).unwrap();
    assert_eq!(stats.followers_count, 1);
    assert_eq!(stats.following_count, 1);
    hive.shutdown();
}

#[test]
fn cross_document_isolation_between_unrelated_pairs() {
    let hive = hive_with_users(&["a", "b", "c", "d"]);

    hive.follows().follow(&uid("b"), &uid("a")).unwrap();
    hive.follows().follow(&uid("d"), &uid("c")).unwrap();
    hive.drain();

    assert_eq!(hive.follows().stats(&uid("a")).unwrap().followers_count, 1);
    assert_eq!(hive.follows().stats(&uid("c")).unwrap().followers_count, 1);
    assert_eq!(hive.follows().stats(&uid("b")).unwrap().followers_count, 0);
    assert_eq!(hive.follows().stats(&uid("d")).unwrap().following_count, 1);
    hive.shutdown();
}
