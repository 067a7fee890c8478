mod common;

use common::{MockService, make_artist, make_enriched, make_features, make_track};
use curacli::cli::evaluate;
use curacli::management::RulesManager;
use curacli::rules::{PLAYLIST_PREFIX, RuleSet, RuleSpec};
use curacli::types::{AudioFeatures, PlaylistSummary};

fn enriched_with_energy(energy: f64) -> curacli::types::EnrichedTrack {
    make_enriched(
        make_track("t1", "Track One", "a1"),
        Some(make_features(energy)),
        None,
    )
}

#[test]
fn test_min_bound_rejects_below_and_accepts_above() {
    let spec = RuleSpec {
        min_energy: Some(0.5),
        ..RuleSpec::named("High Energy")
    };

    assert!(!spec.check(&enriched_with_energy(0.3)));
    assert!(spec.check(&enriched_with_energy(0.6)));
    // inclusive bound
    assert!(spec.check(&enriched_with_energy(0.5)));
}

#[test]
fn test_max_bound_rejects_above() {
    let spec = RuleSpec {
        max_energy: Some(0.5),
        ..RuleSpec::named("Low Energy")
    };

    assert!(spec.check(&enriched_with_energy(0.4)));
    assert!(!spec.check(&enriched_with_energy(0.7)));
}

#[test]
fn test_explicit_zero_is_a_real_bound() {
    // a configured bound of 0 must constrain, not read as "unset"
    let spec = RuleSpec {
        min_mode: Some(0.0),
        ..RuleSpec::named("Any Mode")
    };

    let features = AudioFeatures {
        mode: Some(0.0),
        ..AudioFeatures::default()
    };
    let track = make_enriched(make_track("t1", "Track One", "a1"), Some(features), None);
    assert!(spec.check(&track));

    let spec = RuleSpec {
        max_valence: Some(0.0),
        ..RuleSpec::named("Zero Valence")
    };
    let features = AudioFeatures {
        valence: Some(0.2),
        ..AudioFeatures::default()
    };
    let track = make_enriched(make_track("t2", "Track Two", "a1"), Some(features), None);
    assert!(!spec.check(&track));
}

#[test]
fn test_null_feature_value_skips_that_bound() {
    let spec = RuleSpec {
        min_energy: Some(0.5),
        max_tempo: Some(120.0),
        ..RuleSpec::named("Bounded")
    };

    // energy present and passing, tempo absent: tempo bound must not veto
    let features = AudioFeatures {
        energy: Some(0.8),
        tempo: None,
        ..AudioFeatures::default()
    };
    let track = make_enriched(make_track("t1", "Track One", "a1"), Some(features), None);
    assert!(spec.check(&track));

    // no analysis at all: no bound disqualifies
    let track = make_enriched(make_track("t2", "Track Two", "a1"), None, None);
    assert!(spec.check(&track));
}

#[test]
fn test_genre_inclusion_substring_match() {
    let spec = RuleSpec {
        genres: vec!["rock".to_string(), "metal".to_string()],
        ..RuleSpec::named("Rock & Metal")
    };

    let artist = make_artist("a1", "Band", &["hard rock"]);
    let track = make_enriched(make_track("t1", "Track One", "a1"), None, Some(artist));
    assert!(spec.check(&track));

    let artist = make_artist("a2", "Other", &["tropical house"]);
    let track = make_enriched(make_track("t2", "Track Two", "a2"), None, Some(artist));
    assert!(!spec.check(&track));
}

#[test]
fn test_genre_exclusion_takes_precedence() {
    let spec = RuleSpec {
        genres: vec!["rock".to_string(), "metal".to_string()],
        not_genres: vec!["funk metal".to_string()],
        ..RuleSpec::named("Rock & Metal")
    };

    // "nu metal" matches the inclusion list, but the exclusion wins
    let artist = make_artist("a1", "Band", &["nu metal", "funk metal"]);
    let track = make_enriched(make_track("t1", "Track One", "a1"), None, Some(artist));
    assert!(!spec.check(&track));
}

#[test]
fn test_empty_genre_lists_always_pass() {
    let spec = RuleSpec::named("Anything");

    let artist = make_artist("a1", "Band", &["free jazz"]);
    let track = make_enriched(make_track("t1", "Track One", "a1"), None, Some(artist));
    assert!(spec.check(&track));

    // no artist info either
    let track = make_enriched(make_track("t2", "Track Two", "a1"), None, None);
    assert!(spec.check(&track));
}

#[test]
fn test_missing_artist_fails_inclusion_list() {
    let spec = RuleSpec {
        genres: vec!["rock".to_string()],
        ..RuleSpec::named("Rock")
    };

    let track = make_enriched(make_track("t1", "Track One", "a1"), None, None);
    assert!(!spec.check(&track));
}

#[test]
fn test_rule_spec_deserializes_with_sparse_fields() {
    let json = r#"{"name": "Acoustic", "min_acousticness": 0.8}"#;
    let spec: RuleSpec = serde_json::from_str(json).unwrap();
    assert_eq!(spec.name, "Acoustic");
    assert_eq!(spec.min_acousticness, Some(0.8));
    assert_eq!(spec.max_acousticness, None);
    assert!(spec.genres.is_empty());
    assert!(spec.not_genres.is_empty());
}

#[tokio::test]
async fn test_provision_deletes_same_name_playlists() {
    let mut mock = MockService::default();
    let stale_name = format!("{} Rock", PLAYLIST_PREFIX);
    mock.playlists = vec![
        PlaylistSummary {
            id: "old-1".to_string(),
            name: stale_name.clone(),
        },
        PlaylistSummary {
            id: "keep".to_string(),
            name: "My Mixtape".to_string(),
        },
        PlaylistSummary {
            id: "old-2".to_string(),
            name: stale_name.clone(),
        },
    ];

    let rule_set = RuleSet::provision(&mut mock, RuleSpec::named("Rock"))
        .await
        .unwrap();

    assert_eq!(mock.unfollowed, vec!["old-1", "old-2"]);
    assert_eq!(mock.created, vec![stale_name.clone()]);
    assert_eq!(rule_set.playlist_name(), stale_name);
    assert_eq!(rule_set.playlist_id(), "playlist-1");
}

#[tokio::test]
async fn test_batch_flush_at_exactly_one_hundred() {
    let mut mock = MockService::default();
    let mut rule_set = RuleSet::provision(&mut mock, RuleSpec::named("Everything"))
        .await
        .unwrap();

    let mut expected_ids = Vec::new();
    for i in 0..100 {
        let id = format!("t{}", i);
        expected_ids.push(id.clone());
        let track = make_enriched(make_track(&id, "Track", "a1"), None, None);
        let added = rule_set.check_and_add(&mut mock, &track).await.unwrap();
        assert!(added);
    }

    // exactly one remote call carrying exactly those hundred ids
    assert_eq!(mock.added.len(), 1);
    let (playlist_id, ids) = &mock.added[0];
    assert_eq!(playlist_id, rule_set.playlist_id());
    assert_eq!(*ids, expected_ids);
    assert_eq!(rule_set.pending_len(), 0);
}

#[tokio::test]
async fn test_failed_flush_retries_in_capped_batches() {
    let mut mock = MockService::default();
    let mut rule_set = RuleSet::provision(&mut mock, RuleSpec::named("Everything"))
        .await
        .unwrap();

    mock.fail_adds = 1;
    for i in 0..100 {
        let track = make_enriched(make_track(&format!("t{}", i), "Track", "a1"), None, None);
        let result = rule_set.check_and_add(&mut mock, &track).await;
        if i == 99 {
            // the hundredth acceptance flushes and the remote call fails;
            // nothing may be dropped
            assert!(result.is_err());
        } else {
            assert!(result.unwrap());
        }
    }
    assert_eq!(rule_set.pending_len(), 100);

    // the next acceptance re-triggers the flush over a 101-deep queue; it
    // must go out as capped calls, never one oversized call
    let track = make_enriched(make_track("t100", "Track", "a1"), None, None);
    assert!(rule_set.check_and_add(&mut mock, &track).await.unwrap());

    assert!(mock.add_calls.iter().all(|ids| ids.len() <= 100));
    assert_eq!(rule_set.pending_len(), 0);
    assert_eq!(rule_set.finish(&mut mock).await.unwrap(), 101);
}

#[tokio::test]
async fn test_flush_error_track_is_not_reported_as_unmatched() {
    let mut mock = MockService::default();
    let mut rule_set = RuleSet::provision(&mut mock, RuleSpec::named("Everything"))
        .await
        .unwrap();

    for i in 0..99 {
        let track = make_enriched(make_track(&format!("t{}", i), "Track", "a1"), None, None);
        rule_set.check_and_add(&mut mock, &track).await.unwrap();
    }

    // the hundredth acceptance flushes and the flush fails; the track is
    // still queued, so it must not land in the not-added report
    mock.fail_adds = 1;
    let mut rule_sets = vec![rule_set];
    let mut not_added = Vec::new();
    let track = make_enriched(make_track("t99", "Track", "a1"), None, None);
    evaluate(&mut mock, &mut rule_sets, vec![track], &mut not_added).await;

    assert!(not_added.is_empty());
    assert_eq!(rule_sets[0].pending_len(), 100);

    // the final flush delivers it
    assert_eq!(rule_sets[0].finish(&mut mock).await.unwrap(), 100);
}

#[tokio::test]
async fn test_finish_flushes_partial_batch() {
    let mut mock = MockService::default();
    let mut rule_set = RuleSet::provision(&mut mock, RuleSpec::named("Everything"))
        .await
        .unwrap();

    for i in 0..3 {
        let track = make_enriched(make_track(&format!("t{}", i), "Track", "a1"), None, None);
        rule_set.check_and_add(&mut mock, &track).await.unwrap();
    }

    let added = rule_set.finish(&mut mock).await.unwrap();
    assert_eq!(added, 3);
    assert_eq!(mock.added.len(), 1);
    assert_eq!(mock.added[0].1, vec!["t0", "t1", "t2"]);
}

#[tokio::test]
async fn test_finish_with_empty_queue_issues_no_call() {
    let mut mock = MockService::default();
    let mut rule_set = RuleSet::provision(&mut mock, RuleSpec::named("Empty"))
        .await
        .unwrap();

    let added = rule_set.finish(&mut mock).await.unwrap();
    assert_eq!(added, 0);
    assert!(mock.added.is_empty());
}

#[tokio::test]
async fn test_rejected_tracks_are_not_queued() {
    let mut mock = MockService::default();
    let spec = RuleSpec {
        min_energy: Some(0.5),
        ..RuleSpec::named("High Energy")
    };
    let mut rule_set = RuleSet::provision(&mut mock, spec).await.unwrap();

    let track = make_enriched(
        make_track("t1", "Track One", "a1"),
        Some(make_features(0.2)),
        None,
    );
    let added = rule_set.check_and_add(&mut mock, &track).await.unwrap();

    assert!(!added);
    assert_eq!(rule_set.pending_len(), 0);
}

#[tokio::test]
#[should_panic(expected = "finished rule set")]
async fn test_check_after_finish_panics() {
    let mut mock = MockService::default();
    let mut rule_set = RuleSet::provision(&mut mock, RuleSpec::named("Closed"))
        .await
        .unwrap();
    rule_set.finish(&mut mock).await.unwrap();

    let track = make_enriched(make_track("t1", "Track One", "a1"), None, None);
    let _ = rule_set.check_and_add(&mut mock, &track).await;
}

#[test]
fn test_default_rules_carry_full_genre_lists() {
    let manager = RulesManager::defaults();
    assert_eq!(manager.count(), 8);

    let specs = manager.into_specs();
    let pop = specs.iter().find(|s| s.name == "High Energy Pop").unwrap();
    for genre in ["pop", "girl group", "game", "multidisciplinary", "twitch"] {
        assert!(pop.genres.iter().any(|g| g == genre));
    }

    let rock = specs.iter().find(|s| s.name == "Rock & Metal").unwrap();
    assert!(rock.genres.iter().any(|g| g == "slayer"));
}

#[test]
fn test_describe_bounds_lists_configured_bounds_only() {
    let spec = RuleSpec {
        min_energy: Some(0.5),
        max_tempo: Some(120.0),
        ..RuleSpec::named("Described")
    };

    let description = spec.describe_bounds();
    assert!(description.contains("energy >= 0.5"));
    assert!(description.contains("tempo <= 120"));
    assert!(!description.contains("valence"));
}
