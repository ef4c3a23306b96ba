//! Time ↔ chunk index mapping over a single element snapshot.

use std::time::Duration;

use crate::StreamElement;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Converts manifest ticks to wall-clock duration, rounding down.
///
/// A zero timescale yields `Duration::ZERO`.
pub fn ticks_to_duration(ticks: u64, timescale: u64) -> Duration {
    if timescale == 0 {
        return Duration::ZERO;
    }
    let nanos = u128::from(ticks) * NANOS_PER_SEC / u128::from(timescale);
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

/// Converts a duration to manifest ticks, rounding down.
///
/// Saturates at `u64::MAX`.
pub fn duration_to_ticks(duration: Duration, timescale: u64) -> u64 {
    duration
        .as_nanos()
        .checked_mul(u128::from(timescale))
        .map_or(u64::MAX, |scaled| {
            u64::try_from(scaled / NANOS_PER_SEC).unwrap_or(u64::MAX)
        })
}

impl StreamElement {
    /// Index of the chunk whose half-open interval contains `time`.
    ///
    /// Times before the first chunk map to `0`; times at or after the end of
    /// the last chunk map to `chunk_count()`.
    pub fn chunk_index_for_time(&self, time: Duration) -> usize {
        let count = self.chunk_count();
        if count == 0 || time >= self.end_time {
            return count;
        }
        self.chunk_start_times
            .partition_point(|&start| start <= time)
            .saturating_sub(1)
    }

    /// # Panics
    ///
    /// Panics if `chunk_index >= chunk_count()`.
    pub fn start_time(&self, chunk_index: usize) -> Duration {
        self.chunk_start_times[chunk_index]
    }

    /// # Panics
    ///
    /// Panics if `chunk_index >= chunk_count()`.
    pub fn chunk_duration(&self, chunk_index: usize) -> Duration {
        let start = self.chunk_start_times[chunk_index];
        let end = self
            .chunk_start_times
            .get(chunk_index + 1)
            .copied()
            .unwrap_or(self.end_time);
        end - start
    }

    /// # Panics
    ///
    /// Panics if `chunk_index >= chunk_count()`.
    pub fn chunk_end_time(&self, chunk_index: usize) -> Duration {
        self.start_time(chunk_index) + self.chunk_duration(chunk_index)
    }

    /// End of the last chunk, or `None` for an empty element.
    pub fn end_time(&self) -> Option<Duration> {
        (self.chunk_count() > 0).then_some(self.end_time)
    }
}
