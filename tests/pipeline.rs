//! End-to-end pipeline tests: collect from a scripted source, persist the
//! raw CSV, normalize it, and check the analysis-ready output.

use std::sync::Mutex;

use async_trait::async_trait;
use csv::ReaderBuilder;
use tempfile::tempdir;

use geopulse::analysis::{default_transformer, UNCLASSIFIED};
use geopulse::collector::Collector;
use geopulse::dataset::{normalize_file, write_raw_posts, SENTIMENT_COLUMN};
use geopulse::models::{Coordinates, Geocode, RawPost};
use geopulse::source::{PageRequest, PostSource, SourceError};

/// Source that serves a fixed timeline in pages of `page_size`, honoring
/// the older-than watermark, optionally failing once between pages.
struct TimelineSource {
    timeline: Vec<RawPost>,
    page_size: usize,
    fail_on_request: Mutex<Option<usize>>,
    requests_seen: Mutex<usize>,
}

impl TimelineSource {
    fn new(timeline: Vec<RawPost>, page_size: usize) -> Self {
        Self {
            timeline,
            page_size,
            fail_on_request: Mutex::new(None),
            requests_seen: Mutex::new(0),
        }
    }

    fn fail_once_at(self, request_index: usize) -> Self {
        *self.fail_on_request.lock().unwrap() = Some(request_index);
        self
    }
}

#[async_trait]
impl PostSource for TimelineSource {
    async fn fetch_page(&self, req: &PageRequest) -> Result<Vec<RawPost>, SourceError> {
        let seen = {
            let mut counter = self.requests_seen.lock().unwrap();
            let current = *counter;
            *counter += 1;
            current
        };

        {
            let mut fail_at = self.fail_on_request.lock().unwrap();
            if *fail_at == Some(seen) {
                *fail_at = None;
                return Err(SourceError::RateLimited { status: 429 });
            }
        }

        let page: Vec<RawPost> = self
            .timeline
            .iter()
            .filter(|p| req.older_than.map(|w| p.id < w).unwrap_or(true))
            .take(req.count.min(self.page_size))
            .cloned()
            .collect();
        Ok(page)
    }
}

fn post(id: u64, text: &str, location: Option<&str>) -> RawPost {
    RawPost {
        id,
        created_at: "Mon Sep 24 03:35:21 +0000 2018".to_string(),
        author: format!("user{id}"),
        text: text.to_string(),
        location: location.map(str::to_string),
        coordinates: Some(Coordinates {
            longitude: -122.4194,
            latitude: 37.7749,
        }),
        retweet_count: id % 7,
        favorite_count: id % 11,
    }
}

fn timeline() -> Vec<RawPost> {
    vec![
        post(
            105,
            "Check this out!! http://x.co #cool @bob",
            Some("san francisco"),
        ),
        post(104, "Teh weather is great today", Some("Austin, Texas")),
        post(103, "this is terrible", None),
        post(102, "nothing much happening", Some("planet earth 🌍")),
        post(101, "LOVE this city!!! ❤️", Some("earth")),
    ]
}

fn region() -> Geocode {
    "37.7749,-122.4194,50km".parse().unwrap()
}

#[tokio::test]
async fn collect_then_normalize_produces_analysis_ready_csv() {
    let dir = tempdir().unwrap();
    let raw_path = dir.path().join("raw_posts.csv");
    let normalized_path = dir.path().join("normalized_posts.csv");

    let collector = Collector::new(TimelineSource::new(timeline(), 2));
    let posts = collector.collect(&region(), 10, "en").await.unwrap();
    assert_eq!(posts.len(), 5);

    // Newest first, no duplicates, strictly decreasing ids.
    let ids: Vec<u64> = posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![105, 104, 103, 102, 101]);

    write_raw_posts(&raw_path, &posts).unwrap();
    let report = normalize_file(&raw_path, &normalized_path, &default_transformer()).unwrap();
    assert_eq!(report.text_column, "Tweet");
    assert_eq!(report.rows, 5);

    let mut reader = ReaderBuilder::new().from_path(&normalized_path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.iter().last().unwrap(), SENTIMENT_COLUMN);

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    let text_idx = 2;
    let location_idx = 3;
    let score_idx = headers.len() - 1;

    for row in &rows {
        // Text is lowercase alphanumeric-and-space only, markup gone.
        assert!(row[text_idx]
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == ' '));
        assert!(!row[text_idx].contains("http"));

        // Score is always a float in [-1, 1] here (no empty-text rows).
        let score: f64 = row[score_idx].parse().unwrap();
        assert!((-1.0..=1.0).contains(&score));
    }

    // Typo corrected by the spelling pass.
    assert!(rows[1][text_idx].starts_with("the weather is great"));

    // Location standardization: recognized shapes kept, the rest falls back.
    assert_eq!(&rows[0][location_idx], "san francisco");
    assert_eq!(&rows[1][location_idx], "Austin, Texas");
    assert_eq!(&rows[2][location_idx], UNCLASSIFIED);
    assert_eq!(&rows[3][location_idx], "planet earth 🌍");
    assert_eq!(&rows[4][location_idx], UNCLASSIFIED);

    // Polarity direction survives the whole pipeline.
    let score_of = |i: usize| rows[i][score_idx].parse::<f64>().unwrap();
    assert!(score_of(1) > 0.0, "positive post should score positive");
    assert!(score_of(2) < 0.0, "negative post should score negative");
    assert!(score_of(4) > 0.0, "positive post should score positive");
}

#[tokio::test(start_paused = true)]
async fn transient_failure_mid_collection_changes_nothing() {
    let clean = Collector::new(TimelineSource::new(timeline(), 2));
    let baseline = clean.collect(&region(), 10, "en").await.unwrap();

    let faulty = Collector::new(TimelineSource::new(timeline(), 2).fail_once_at(1));
    let recovered = faulty.collect(&region(), 10, "en").await.unwrap();

    assert_eq!(baseline, recovered);
}

#[tokio::test]
async fn target_count_truncates_the_walk() {
    let collector = Collector::new(TimelineSource::new(timeline(), 2));
    let posts = collector.collect(&region(), 3, "en").await.unwrap();
    let ids: Vec<u64> = posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![105, 104, 103]);
}
