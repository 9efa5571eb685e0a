//! Tests for [`AnalysisCache`] — TTL expiry, lazy eviction, and sweeping.

use std::time::Duration;

use huginn::{AnalysisCache, AnalysisResult, CacheConfig, CandidateProfile, JobPosting};

fn profile() -> CandidateProfile {
    CandidateProfile::new(
        vec!["Rust".into(), "Tokio".into()],
        6,
        "Backend Engineer",
        "BSc Computer Science",
    )
}

fn job() -> JobPosting {
    JobPosting::new(
        "Senior Backend Engineer",
        "Acme",
        "Own the ingestion pipeline.",
        "Rust, async, 5+ years",
    )
}

fn result(score: u8) -> AnalysisResult {
    AnalysisResult {
        match_score: score,
        strengths: vec!["systems background".into()],
        improvements: vec![],
        narrative: "solid fit".into(),
    }
}

#[test]
fn set_then_get_returns_value_unchanged() {
    let cache = AnalysisCache::new(&CacheConfig::default());
    let key = AnalysisCache::key(&profile(), &job());

    assert!(cache.get(&key).is_none());
    cache.set(key, result(82));
    assert_eq!(cache.get(&key), Some(result(82)));
}

#[test]
fn set_overwrites_existing_entry() {
    let cache = AnalysisCache::new(&CacheConfig::default());
    let key = AnalysisCache::key(&profile(), &job());

    cache.set(key, result(40));
    cache.set(key, result(90));
    assert_eq!(cache.get(&key).unwrap().match_score, 90);
    assert_eq!(cache.len(), 1);
}

#[test]
fn expired_entry_is_a_miss_and_removed() {
    let cache = AnalysisCache::new(&CacheConfig::default());
    let key = AnalysisCache::key(&profile(), &job());
    cache.set_with_ttl(key, result(70), Duration::from_millis(20));
    assert!(cache.get(&key).is_some());

    std::thread::sleep(Duration::from_millis(30));
    assert!(cache.get(&key).is_none());
    assert_eq!(cache.len(), 0, "lazy eviction should remove the entry");
}

#[test]
fn sweep_removes_only_expired_entries() {
    let cache = AnalysisCache::new(&CacheConfig::default());
    let fresh_key = AnalysisCache::key(&profile(), &job());
    let mut other_job = job();
    other_job.company = "Globex".into();
    let stale_key = AnalysisCache::key(&profile(), &other_job);

    cache.set(fresh_key, result(82));
    cache.set_with_ttl(stale_key, result(10), Duration::ZERO);

    assert_eq!(cache.sweep(), 1);
    assert_eq!(cache.len(), 1);
    assert!(cache.get(&fresh_key).is_some());
}

#[test]
fn sweep_on_empty_cache_is_a_no_op() {
    let cache = AnalysisCache::new(&CacheConfig::default());
    assert_eq!(cache.sweep(), 0);
}

#[tokio::test]
async fn background_sweeper_evicts_expired_entries() {
    let cache = AnalysisCache::new(
        &CacheConfig::new()
            .default_ttl(Duration::ZERO)
            .sweep_interval(Duration::from_millis(20)),
    );
    let key = AnalysisCache::key(&profile(), &job());
    cache.set(key, result(55));
    cache.start_sweeper();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(cache.is_empty());
    cache.stop_sweeper();
}

#[test]
fn clear_removes_everything() {
    let cache = AnalysisCache::new(&CacheConfig::default());
    cache.set(AnalysisCache::key(&profile(), &job()), result(82));
    assert!(!cache.is_empty());
    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn keys_differ_per_field_of_the_normalized_subset() {
    let base = AnalysisCache::key(&profile(), &job());

    let mut p = profile();
    p.current_title = "Platform Engineer".into();
    assert_ne!(base, AnalysisCache::key(&p, &job()));

    let mut p = profile();
    p.education = "PhD".into();
    assert_ne!(base, AnalysisCache::key(&p, &job()));

    let mut p = profile();
    p.skills.push("Kafka".into());
    assert_ne!(base, AnalysisCache::key(&p, &job()));

    let mut j = job();
    j.title = "Staff Engineer".into();
    assert_ne!(base, AnalysisCache::key(&profile(), &j));

    let mut j = job();
    j.description = "Different work".into();
    assert_ne!(base, AnalysisCache::key(&profile(), &j));

    let mut j = job();
    j.requirements = "Go".into();
    assert_ne!(base, AnalysisCache::key(&profile(), &j));
}

#[test]
fn key_is_stable_for_equal_inputs() {
    // repeated computation over fresh clones must agree; the digest is
    // content-only, so this also holds across process restarts
    for _ in 0..10 {
        assert_eq!(
            AnalysisCache::key(&profile(), &job()),
            AnalysisCache::key(&profile().clone(), &job().clone())
        );
    }
}
