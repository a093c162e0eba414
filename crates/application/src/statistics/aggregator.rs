//! Statistics aggregator.
//!
//! Read-only aggregates over result history, filtered by owner and time
//! window.

use super::window::{TimeFrame, TimeWindow};
use crate::ports::ResultRepository;
use chrono::{DateTime, Utc};
use ielts_common::ExamConfig;
use ielts_domain::{AccountId, AppResult, BandScore, StatisticsError, TestAccess, TestResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Whose results are aggregated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "account_id", rename_all = "snake_case")]
pub enum StatisticsScope {
    /// One account's results on public and private tests
    Account(AccountId),
    /// Every result recorded against a public test
    PublicTests,
}

/// Scope plus optional window of a statistics query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsQuery {
    pub scope: StatisticsScope,
    pub frame: Option<TimeFrame>,
    pub order: Option<i64>,
}

impl StatisticsQuery {
    pub fn account(account_id: AccountId) -> Self {
        Self {
            scope: StatisticsScope::Account(account_id),
            frame: None,
            order: None,
        }
    }

    pub fn public_tests() -> Self {
        Self {
            scope: StatisticsScope::PublicTests,
            frame: None,
            order: None,
        }
    }

    pub fn within(mut self, frame: TimeFrame, order: Option<i64>) -> Self {
        self.frame = Some(frame);
        self.order = order;
        self
    }
}

/// Which aggregate to compute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    Count,
    TotalTime,
    AverageBand,
    BandHistogram,
}

/// Result of one aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "aggregation", content = "value", rename_all = "snake_case")]
pub enum StatisticsValue {
    Count(u64),
    TotalTime(Duration),
    AverageBand(BandScore),
    BandHistogram(BandHistogram),
}

/// Result counts per band, with a bucket for every band from 1.0 to 9.0
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<BandBucket>", from = "Vec<BandBucket>")]
pub struct BandHistogram {
    buckets: BTreeMap<BandScore, u64>,
}

impl BandHistogram {
    pub fn new() -> Self {
        Self {
            buckets: BandScore::all().map(|band| (band, 0)).collect(),
        }
    }

    pub fn record(&mut self, band: BandScore) {
        *self.buckets.entry(band).or_insert(0) += 1;
    }

    pub fn get(&self, band: BandScore) -> u64 {
        self.buckets.get(&band).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.buckets.values().sum()
    }

    /// Buckets in ascending band order
    pub fn iter(&self) -> impl Iterator<Item = (BandScore, u64)> + '_ {
        self.buckets.iter().map(|(band, count)| (*band, *count))
    }
}

/// One histogram bucket as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandBucket {
    pub band: BandScore,
    pub count: u64,
}

impl From<BandHistogram> for Vec<BandBucket> {
    fn from(histogram: BandHistogram) -> Self {
        histogram
            .iter()
            .map(|(band, count)| BandBucket { band, count })
            .collect()
    }
}

impl From<Vec<BandBucket>> for BandHistogram {
    fn from(buckets: Vec<BandBucket>) -> Self {
        let mut histogram = Self::new();
        for bucket in buckets {
            histogram.buckets.insert(bucket.band, bucket.count);
        }
        histogram
    }
}

impl Default for BandHistogram {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> FromIterator<&'a TestResult> for BandHistogram {
    fn from_iter<I: IntoIterator<Item = &'a TestResult>>(results: I) -> Self {
        let mut histogram = Self::new();
        for result in results {
            histogram.record(BandScore::from_raw_score(result.score));
        }
        histogram
    }
}

/// Sum of completion times
pub fn total_time(results: &[TestResult]) -> Duration {
    results.iter().map(|result| result.complete_time).sum()
}

/// Band of the floored mean raw score
pub fn average_band(results: &[TestResult]) -> Result<BandScore, StatisticsError> {
    if results.is_empty() {
        return Err(StatisticsError::NoResultsInWindow);
    }

    let sum: u64 = results.iter().map(|result| u64::from(result.score)).sum();
    let mean = sum / results.len() as u64;
    Ok(BandScore::from_raw_score(
        u32::try_from(mean).unwrap_or(u32::MAX),
    ))
}

/// Statistics aggregator implementation
pub struct StatisticsAggregator<R>
where
    R: ResultRepository,
{
    results: Arc<R>,
    first_year: i32,
}

impl<R> StatisticsAggregator<R>
where
    R: ResultRepository,
{
    pub fn new(results: Arc<R>, config: &ExamConfig) -> Self {
        Self {
            results,
            first_year: config.first_statistics_year,
        }
    }

    /// Compute the requested aggregation
    pub async fn aggregate(
        &self,
        query: StatisticsQuery,
        aggregation: Aggregation,
        now: DateTime<Utc>,
    ) -> AppResult<StatisticsValue> {
        Ok(match aggregation {
            Aggregation::Count => StatisticsValue::Count(self.count(query, now).await?),
            Aggregation::TotalTime => StatisticsValue::TotalTime(self.total_time(query, now).await?),
            Aggregation::AverageBand => {
                StatisticsValue::AverageBand(self.average_band(query, now).await?)
            }
            Aggregation::BandHistogram => {
                StatisticsValue::BandHistogram(self.band_histogram(query, now).await?)
            }
        })
    }

    /// Number of results in the window
    pub async fn count(&self, query: StatisticsQuery, now: DateTime<Utc>) -> AppResult<u64> {
        Ok(self.load(query, now).await?.len() as u64)
    }

    /// Total time spent on results in the window
    pub async fn total_time(
        &self,
        query: StatisticsQuery,
        now: DateTime<Utc>,
    ) -> AppResult<Duration> {
        Ok(total_time(&self.load(query, now).await?))
    }

    /// Band of the average raw score; fails on an empty window
    pub async fn average_band(
        &self,
        query: StatisticsQuery,
        now: DateTime<Utc>,
    ) -> AppResult<BandScore> {
        Ok(average_band(&self.load(query, now).await?)?)
    }

    /// Distribution of results over bands
    pub async fn band_histogram(
        &self,
        query: StatisticsQuery,
        now: DateTime<Utc>,
    ) -> AppResult<BandHistogram> {
        Ok(self.load(query, now).await?.iter().collect())
    }

    /// Results of the query's scope that fall in its window
    #[instrument(skip(self), fields(first_year = self.first_year))]
    async fn load(&self, query: StatisticsQuery, now: DateTime<Utc>) -> AppResult<Vec<TestResult>> {
        let window = TimeWindow::resolve(query.frame, query.order, now, self.first_year)?;

        let results = match query.scope {
            StatisticsScope::Account(account_id) => {
                self.results.list_by_account(account_id).await?
            }
            StatisticsScope::PublicTests => self
                .results
                .list_public()
                .await?
                .into_iter()
                .filter(|result| result.test.access() == TestAccess::Public)
                .collect(),
        };

        let matching: Vec<TestResult> = results
            .into_iter()
            .filter(|result| window.contains(&result.created_at))
            .collect();

        debug!(?window, matching = matching.len(), "Loaded results in window");
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ielts_domain::{ResultId, TestId, TestReference};
    use proptest::prelude::*;

    fn result(score: u32, minutes: u64) -> TestResult {
        TestResult {
            id: ResultId::new(),
            account_id: AccountId::new(),
            test: TestReference::Public(TestId::new()),
            score,
            complete_time: Duration::from_secs(minutes * 60),
            created_at: Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap(),
        }
    }

    fn band(value: f64) -> BandScore {
        BandScore::from_value(value).unwrap()
    }

    #[test]
    fn test_histogram_has_every_bucket() {
        let histogram = BandHistogram::new();
        assert_eq!(histogram.iter().count(), 17);
        assert_eq!(histogram.total(), 0);
    }

    #[test]
    fn test_histogram_counts_converted_bands() {
        let results: Vec<TestResult> = [1, 4, 9, 36, 40].iter().map(|s| result(*s, 30)).collect();
        let histogram: BandHistogram = results.iter().collect();

        assert_eq!(histogram.get(band(1.0)), 1);
        assert_eq!(histogram.get(band(3.0)), 1);
        assert_eq!(histogram.get(band(4.0)), 1);
        assert_eq!(histogram.get(band(8.5)), 1);
        assert_eq!(histogram.get(band(9.0)), 1);
        assert_eq!(histogram.get(band(5.0)), 0);
        assert_eq!(histogram.total(), 5);
    }

    #[test]
    fn test_average_band_floors_mean() {
        // (29 + 30) / 2 floors to 29 -> 7.0, while 29.5 would round to 7.5
        let results = vec![result(29, 60), result(30, 60)];
        assert_eq!(average_band(&results).unwrap(), band(7.0));

        let results = vec![result(30, 60), result(31, 60)];
        assert_eq!(average_band(&results).unwrap(), band(7.5));
    }

    #[test]
    fn test_average_band_of_nothing() {
        assert!(matches!(
            average_band(&[]),
            Err(StatisticsError::NoResultsInWindow)
        ));
    }

    #[test]
    fn test_total_time() {
        let results = vec![result(10, 25), result(20, 40)];
        assert_eq!(total_time(&results), Duration::from_secs(65 * 60));
        assert_eq!(total_time(&[]), Duration::ZERO);
    }

    #[test]
    fn test_histogram_serializes_as_bucket_list() {
        let histogram: BandHistogram = [result(40, 30)].iter().collect();
        let json = serde_json::to_value(&histogram).unwrap();

        let buckets = json.as_array().unwrap();
        assert_eq!(buckets.len(), 17);
        assert_eq!(buckets[16]["band"], 9.0);
        assert_eq!(buckets[16]["count"], 1);
    }

    proptest! {
        #[test]
        fn prop_histogram_total_matches_count(scores in proptest::collection::vec(0u32..=40, 0..50)) {
            let results: Vec<TestResult> = scores.iter().map(|s| result(*s, 1)).collect();
            let histogram: BandHistogram = results.iter().collect();
            prop_assert_eq!(histogram.total(), results.len() as u64);
            prop_assert_eq!(histogram.iter().count(), 17);
        }
    }
}
