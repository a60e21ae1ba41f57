use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const BUCKET_SECONDS: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSample {
    pub timestamp: DateTime<Utc>,
    pub value: u64,
}

/// Occurrence counts bucketed into fixed 10-second windows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleSeries {
    buckets: BTreeMap<i64, u64>,
}

impl SampleSeries {
    pub fn record(&mut self, ts: DateTime<Utc>) {
        *self.buckets.entry(floor_to_bucket(ts)).or_insert(0) += 1;
    }

    /// Folds a batch of externally supplied samples into the series and
    /// returns the total count that was added.
    pub fn merge(&mut self, samples: &[PatternSample]) -> u64 {
        let mut added = 0;
        for sample in samples {
            *self
                .buckets
                .entry(floor_to_bucket(sample.timestamp))
                .or_insert(0) += sample.value;
            added += sample.value;
        }
        added
    }

    pub fn total(&self) -> u64 {
        self.buckets.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    // Snapshot in ascending time order.
    pub fn samples(&self) -> Vec<PatternSample> {
        self.buckets
            .iter()
            .map(|(start, count)| PatternSample {
                timestamp: Utc.timestamp_opt(*start, 0).unwrap(),
                value: *count,
            })
            .collect()
    }
}

fn floor_to_bucket(t: DateTime<Utc>) -> i64 {
    let ts = t.timestamp();
    ts - ts.rem_euclid(BUCKET_SECONDS)
}
