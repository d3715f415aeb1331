//! Time source for response `Date` headers.
//!
//! The clock is an injected dependency of the response writer, so responses
//! carry real time in production and a fixed time under test.

use chrono::{DateTime, Utc};

/// Wall-clock dependency of the response writer.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Format a timestamp the way HTTP `Date` headers expect (RFC 1123, GMT).
pub fn httpdate(t: DateTime<Utc>) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
pub(crate) struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn httpdate_matches_rfc1123() {
        let t = Utc.with_ymd_and_hms(2008, 2, 21, 8, 16, 3).unwrap();
        assert_eq!(httpdate(t), "Thu, 21 Feb 2008 08:16:03 GMT");
    }
}
