use chrono::{DateTime, TimeZone, Utc};

use logmine::config::Config;
use logmine::drain::Drain;

fn ts() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

fn word(mut i: usize) -> String {
    let mut s = String::new();
    for _ in 0..4 {
        s.push(char::from(b'a' + (i % 26) as u8));
        i /= 26;
    }
    s
}

/// A line whose two tokens are unique to `i`, so no pair of lines clears
/// the similarity threshold and every line becomes its own cluster.
fn distinct_line(i: usize) -> String {
    format!("{}x {}y", word(i), word(i))
}

#[test]
fn store_capacity_bounds_live_clusters() {
    let mut drain = Drain::new(Config::default(), "").unwrap();
    for i in 0..400 {
        drain.train(&distinct_line(i), ts()).unwrap();
    }
    assert_eq!(drain.cluster_count(), 300);
    assert!(drain.clusters().len() <= 300);

    // The first hundred clusters were never touched again and fell out.
    assert!(drain.cluster(100).is_none());
    assert!(drain.cluster(101).is_some());

    // One more distinct line evicts the current least recently trained.
    drain.train(&distinct_line(400), ts()).unwrap();
    assert!(drain.cluster(101).is_none());
    assert!(drain.cluster(102).is_some());
    assert_eq!(drain.cluster_count(), 300);
}

#[test]
fn training_refreshes_recency() {
    let config = Config {
        max_clusters: 2,
        ..Config::default()
    };
    let mut drain = Drain::new(config, "").unwrap();
    drain.train("aaa bbb", ts()).unwrap();
    drain.train("ccc ddd", ts()).unwrap();
    // Re-training the first line touches its cluster, so the second
    // cluster is now the eviction candidate.
    drain.train("aaa bbb", ts()).unwrap();
    drain.train("eee fff", ts()).unwrap();

    assert!(drain.cluster(1).is_some());
    assert!(drain.cluster(2).is_none());
    assert!(drain.cluster(3).is_some());
}

#[test]
fn matching_does_not_refresh_recency() {
    let config = Config {
        max_clusters: 2,
        ..Config::default()
    };
    let mut drain = Drain::new(config, "").unwrap();
    drain.train("aaa bbb", ts()).unwrap();
    drain.train("ccc ddd", ts()).unwrap();
    assert!(drain.match_line("aaa bbb").is_some());
    drain.train("eee fff", ts()).unwrap();

    // The match was read-only, so the first cluster stayed oldest.
    assert!(drain.cluster(1).is_none());
    assert!(drain.cluster(2).is_some());
}

#[test]
fn deleted_cluster_is_gone_and_swept() {
    let mut drain = Drain::new(Config::default(), "").unwrap();
    let id = drain.train("red apple", ts()).unwrap().id();
    drain.delete(id);

    assert!(drain.cluster(id).is_none());
    assert!(drain.match_line("red apple").is_none());

    // Retraining starts a fresh cluster; the stale leaf entry is swept on
    // insert rather than resurrected.
    let cluster = drain.train("red apple", ts()).unwrap();
    assert_ne!(cluster.id(), id);
    assert_eq!(cluster.size(), 1);
    assert_eq!(drain.cluster_count(), 1);
}

#[test]
fn zero_capacity_means_unbounded() {
    let config = Config {
        max_clusters: 0,
        ..Config::default()
    };
    let mut drain = Drain::new(config, "").unwrap();
    for i in 0..320 {
        drain.train(&distinct_line(i), ts()).unwrap();
    }
    assert_eq!(drain.cluster_count(), 320);
}
