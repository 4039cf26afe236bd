//! Day-relative bucketing of timestamped records.
//!
//! Day boundaries are half-open: today is `[today_start, tomorrow_start)`,
//! tomorrow is `[tomorrow_start, tomorrow_end)`, upcoming is everything at or
//! after `tomorrow_end`. `Missed` wins over every other bucket for items that
//! are eligible for it and strictly before `now`.
//!
//! An item that is not eligible for `Missed` (a completed goal) and falls
//! before `today_start` lands in no bucket. It is counted in
//! `BucketReport::unplaced` and otherwise dropped.

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Missed,
    Today,
    Tomorrow,
    Upcoming,
}

impl Bucket {
    /// Display order used by the reminder screen.
    pub const ALL: [Bucket; 4] = [Self::Today, Self::Tomorrow, Self::Upcoming, Self::Missed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Missed => "missed",
            Self::Today => "today",
            Self::Tomorrow => "tomorrow",
            Self::Upcoming => "upcoming",
        }
    }
}

/// Why an item's instant could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    Missing,
    Unparseable(String),
}

impl Display for TimestampError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "timestamp is missing"),
            Self::Unparseable(raw) => write!(f, "timestamp `{raw}` cannot be parsed"),
        }
    }
}

impl Error for TimestampError {}

/// Anything the bucketizer can place.
pub trait Bucketable {
    /// Instant compared against the day boundaries.
    fn bucket_instant(&self) -> Result<NaiveDateTime, TimestampError>;

    /// Whether a past instant makes this item `Missed`.
    fn missed_eligible(&self) -> bool {
        true
    }
}

impl<T: Bucketable + ?Sized> Bucketable for &T {
    fn bucket_instant(&self) -> Result<NaiveDateTime, TimestampError> {
        (**self).bucket_instant()
    }

    fn missed_eligible(&self) -> bool {
        (**self).missed_eligible()
    }
}

/// Day boundaries derived from one reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBoundaries {
    pub today_start: NaiveDateTime,
    pub tomorrow_start: NaiveDateTime,
    pub tomorrow_end: NaiveDateTime,
}

impl DayBoundaries {
    pub fn around(now: NaiveDateTime) -> Self {
        let today_start = now.date().and_time(NaiveTime::MIN);
        let tomorrow_start = next_day(today_start);
        Self {
            today_start,
            tomorrow_start,
            tomorrow_end: next_day(tomorrow_start),
        }
    }
}

fn next_day(start: NaiveDateTime) -> NaiveDateTime {
    start
        .checked_add_signed(TimeDelta::days(1))
        .unwrap_or(NaiveDateTime::MAX)
}

/// Places one instant. `None` means the item belongs to no bucket.
pub fn classify(
    instant: NaiveDateTime,
    now: NaiveDateTime,
    bounds: &DayBoundaries,
    missed_eligible: bool,
) -> Option<Bucket> {
    if missed_eligible && instant < now {
        Some(Bucket::Missed)
    } else if instant >= bounds.tomorrow_end {
        Some(Bucket::Upcoming)
    } else if instant >= bounds.tomorrow_start {
        Some(Bucket::Tomorrow)
    } else if instant >= bounds.today_start {
        Some(Bucket::Today)
    } else {
        None
    }
}

/// Items per bucket, each list in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buckets<T> {
    pub missed: Vec<T>,
    pub today: Vec<T>,
    pub tomorrow: Vec<T>,
    pub upcoming: Vec<T>,
}

impl<T> Default for Buckets<T> {
    fn default() -> Self {
        Self {
            missed: Vec::new(),
            today: Vec::new(),
            tomorrow: Vec::new(),
            upcoming: Vec::new(),
        }
    }
}

impl<T> Buckets<T> {
    pub fn get(&self, bucket: Bucket) -> &[T] {
        match bucket {
            Bucket::Missed => &self.missed,
            Bucket::Today => &self.today,
            Bucket::Tomorrow => &self.tomorrow,
            Bucket::Upcoming => &self.upcoming,
        }
    }

    fn get_mut(&mut self, bucket: Bucket) -> &mut Vec<T> {
        match bucket {
            Bucket::Missed => &mut self.missed,
            Bucket::Today => &mut self.today,
            Bucket::Tomorrow => &mut self.tomorrow,
            Bucket::Upcoming => &mut self.upcoming,
        }
    }

    /// Total number of placed items.
    pub fn len(&self) -> usize {
        self.missed.len() + self.today.len() + self.tomorrow.len() + self.upcoming.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Walks buckets in [`Bucket::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Bucket, &T)> + '_ {
        Bucket::ALL
            .into_iter()
            .flat_map(move |bucket| self.get(bucket).iter().map(move |item| (bucket, item)))
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Buckets<U> {
        Buckets {
            missed: self.missed.into_iter().map(&mut f).collect(),
            today: self.today.into_iter().map(&mut f).collect(),
            tomorrow: self.tomorrow.into_iter().map(&mut f).collect(),
            upcoming: self.upcoming.into_iter().map(&mut f).collect(),
        }
    }
}

/// Input item whose instant could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketingError {
    /// Position in the input slice.
    pub index: usize,
    pub reason: TimestampError,
}

/// Result of one classification pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketReport<T> {
    pub now: NaiveDateTime,
    pub buckets: Buckets<T>,
    /// Items excluded because their instant is missing or malformed.
    pub rejected: Vec<BucketingError>,
    /// Items that are neither missed nor on/after today (completed, past due).
    pub unplaced: usize,
}

impl<T: Clone> BucketReport<&T> {
    pub fn cloned(&self) -> BucketReport<T> {
        BucketReport {
            now: self.now,
            buckets: self.buckets.clone().map(|item| item.clone()),
            rejected: self.rejected.clone(),
            unplaced: self.unplaced,
        }
    }
}

/// Partitions `items` relative to `now` without touching them.
pub fn bucketize<T: Bucketable>(items: &[T], now: NaiveDateTime) -> BucketReport<&T> {
    let bounds = DayBoundaries::around(now);
    let mut buckets = Buckets::default();
    let mut rejected = Vec::new();
    let mut unplaced = 0;

    for (index, item) in items.iter().enumerate() {
        match item.bucket_instant() {
            Ok(instant) => match classify(instant, now, &bounds, item.missed_eligible()) {
                Some(bucket) => buckets.get_mut(bucket).push(item),
                None => unplaced += 1,
            },
            Err(reason) => rejected.push(BucketingError { index, reason }),
        }
    }

    BucketReport {
        now,
        buckets,
        rejected,
        unplaced,
    }
}
