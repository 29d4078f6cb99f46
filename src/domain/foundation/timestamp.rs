//! UTC instants used to stamp analysis runs.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Instant a run started; serialized as RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Milliseconds from `self` to `later`; 0 if `later` is earlier.
    pub fn millis_until(&self, later: &Timestamp) -> u64 {
        let gap: Duration = later.0.signed_duration_since(self.0);
        u64::try_from(gap.num_milliseconds()).unwrap_or(0)
    }

    /// Milliseconds elapsed since this instant.
    pub fn elapsed_ms(&self) -> u64 {
        self.millis_until(&Timestamp::now())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_is_measured_forward_and_floored_backward() {
        let start = Timestamp::now();
        let later = Timestamp(start.0 + Duration::milliseconds(250));
        let earlier = Timestamp(start.0 - Duration::seconds(1));

        assert_eq!(start.millis_until(&later), 250);
        assert_eq!(start.millis_until(&earlier), 0);
    }

    #[test]
    fn run_start_is_written_as_rfc3339() {
        let start = Timestamp::now();
        let json = serde_json::to_string(&start).unwrap();
        assert_eq!(json, format!("\"{}\"", start));
        assert_eq!(serde_json::from_str::<Timestamp>(&json).unwrap(), start);
    }
}
