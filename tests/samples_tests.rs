use chrono::{Duration, TimeZone, Utc};

use logmine::samples::{PatternSample, SampleSeries};

#[test]
fn record_buckets_by_ten_seconds() {
    let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut series = SampleSeries::default();
    series.record(t);
    series.record(t + Duration::seconds(3));
    series.record(t + Duration::seconds(9));
    assert_eq!(series.samples().len(), 1);
    assert_eq!(series.total(), 3);

    series.record(t + Duration::seconds(12));
    let samples = series.samples();
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].value, 3);
    assert_eq!(samples[1].value, 1);
}

#[test]
fn merge_folds_counts_and_reports_total() {
    let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut series = SampleSeries::default();
    series.record(t);
    let added = series.merge(&[
        PatternSample {
            timestamp: t + Duration::seconds(5),
            value: 4,
        },
        PatternSample {
            timestamp: t + Duration::seconds(30),
            value: 2,
        },
    ]);
    assert_eq!(added, 6);
    assert_eq!(series.total(), 7);

    // The first merged sample shares the opening bucket.
    let samples = series.samples();
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].value, 5);
}

#[test]
fn samples_come_back_in_time_order() {
    let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut series = SampleSeries::default();
    series.record(t + Duration::seconds(40));
    series.record(t);
    series.record(t + Duration::seconds(20));
    let samples = series.samples();
    let times: Vec<_> = samples.iter().map(|s| s.timestamp).collect();
    let mut sorted = times.clone();
    sorted.sort();
    assert_eq!(times, sorted);
}
