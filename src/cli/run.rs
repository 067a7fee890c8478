use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    enrich::{EnrichmentPipeline, PipelineError},
    error, info,
    management::{ArtistCacheManager, FeatureCacheManager, RulesManager, TokenManager},
    rules::RuleSet,
    spotify::{MusicService, SpotifyClient},
    success,
    types::{EnrichedTrack, NotAddedTableRow},
    utils, warning,
};

/// The full curation run.
///
/// Provisions one playlist per rule spec (delete-by-name, then create),
/// pages through the user's saved tracks, enriches each track through the
/// cache-backed pipeline and offers it to every rule set. Ends with the
/// final batch flushes and a table of tracks that matched zero playlists.
///
/// `limit` caps the number of saved tracks processed; useful for a quick
/// trial run against a large library.
pub async fn run(limit: Option<usize>) {
    let token_mgr = match TokenManager::load().await {
        Ok(manager) => manager,
        Err(e) => {
            error!(
                "Failed to load token. Please run curacli auth\n Error: {}",
                e
            );
        }
    };
    let mut client = SpotifyClient::new(token_mgr);

    let features = FeatureCacheManager::load().await.unwrap_or_else(|_| {
        warning!("Audio-feature cache not found, starting empty.");
        FeatureCacheManager::new()
    });
    let artists = ArtistCacheManager::load().await.unwrap_or_else(|_| {
        warning!("Artist cache not found, starting empty.");
        ArtistCacheManager::new()
    });

    let specs = match RulesManager::load().await {
        Ok(manager) => manager,
        Err(_) => {
            warning!("No rules.json found, using the built-in default rules.");
            RulesManager::defaults()
        }
    }
    .into_specs();

    if specs.is_empty() {
        error!("No playlist rules configured.");
    }

    info!("Provisioning {} playlists...", specs.len());
    let mut rule_sets: Vec<RuleSet> = Vec::new();
    for spec in specs {
        let name = spec.name.clone();
        match RuleSet::provision(&mut client, spec).await {
            Ok(rule_set) => rule_sets.push(rule_set),
            Err(e) => error!("Failed to provision playlist {}: {}", name, e),
        }
    }
    success!("Playlists provisioned.");

    let mut pipeline = EnrichmentPipeline::new(features, artists);

    let pb = ProgressBar::new_spinner();
    pb.set_message("Processing saved tracks...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    let mut not_added: Vec<EnrichedTrack> = Vec::new();
    let mut skipped: usize = 0;
    let mut processed: usize = 0;
    let mut next: Option<String> = None;

    'pages: loop {
        let (tracks, page_next) = match client.saved_tracks_page(next.clone()).await {
            Ok(page) => page,
            Err(e) => {
                pb.finish_and_clear();
                error!("Failed to fetch saved tracks: {}", e);
            }
        };

        for track in tracks {
            processed += 1;
            pb.set_message(format!("Processing track {}...", processed));

            match pipeline.submit(&mut client, track).await {
                Ok(enriched) => {
                    evaluate(&mut client, &mut rule_sets, enriched, &mut not_added).await;
                }
                Err(e) => handle_pipeline_error(e, &mut skipped),
            }

            if let Some(max) = limit {
                if processed >= max {
                    break 'pages;
                }
            }
        }

        match page_next {
            Some(n) => next = Some(n),
            None => break,
        }
    }

    // resolve the partial feature batch so no track goes unevaluated
    match pipeline.finish(&mut client).await {
        Ok(enriched) => evaluate(&mut client, &mut rule_sets, enriched, &mut not_added).await,
        Err(e) => handle_pipeline_error(e, &mut skipped),
    }

    pb.finish_and_clear();

    for rule_set in &mut rule_sets {
        match rule_set.finish(&mut client).await {
            Ok(added) => info!("{}: {} tracks", rule_set.playlist_name(), added),
            Err(e) => warning!(
                "Failed to flush playlist {}: {}",
                rule_set.playlist_name(),
                e
            ),
        }
    }

    success!("Processed {} saved tracks.", processed);
    if skipped > 0 {
        warning!("{} tracks were skipped because enrichment failed.", skipped);
    }

    if !not_added.is_empty() {
        info!("Not added to any playlist:\n");
        let rows: Vec<NotAddedTableRow> = not_added
            .iter()
            .map(|enriched| NotAddedTableRow {
                artist: enriched
                    .artist
                    .as_ref()
                    .map(|a| a.name.clone())
                    .or_else(|| {
                        enriched
                            .track
                            .primary_artist()
                            .map(|a| a.name.clone())
                    })
                    .unwrap_or_default(),
                track: enriched.track.name.clone(),
                genres: enriched
                    .artist
                    .as_ref()
                    .map(|a| utils::format_genres(&a.genres, 3))
                    .unwrap_or_default(),
            })
            .collect();

        println!("{}", Table::new(rows));
    }
}

/// Offers each enriched track to every rule set. Tracks no rule set
/// accepted are collected for the final report. A flush error still means
/// the track was accepted and queued, so it does not land in the report.
pub async fn evaluate<C: MusicService>(
    client: &mut C,
    rule_sets: &mut [RuleSet],
    enriched: Vec<EnrichedTrack>,
    not_added: &mut Vec<EnrichedTrack>,
) {
    for track in enriched {
        let mut matched = false;

        for rule_set in rule_sets.iter_mut() {
            match rule_set.check_and_add(client, &track).await {
                Ok(added) => matched = matched || added,
                Err(e) => {
                    // the id is already queued and goes with the next flush
                    matched = true;
                    warning!(
                        "Failed to flush playlist {}: {}",
                        rule_set.playlist_name(),
                        e
                    );
                }
            }
        }

        if !matched {
            not_added.push(track);
        }
    }
}

fn handle_pipeline_error(err: PipelineError, skipped: &mut usize) {
    match err {
        PipelineError::FeatureFetch { source, tracks } => {
            *skipped += tracks.len();
            warning!(
                "Audio-feature fetch failed for a batch of {} tracks, skipping them this run: {}",
                tracks.len(),
                source
            );
        }
    }
}
