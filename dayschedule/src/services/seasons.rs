//! Meteorological seasons.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed-month meteorological season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeteoSeason {
    Winter = 0,
    Spring = 1,
    Summer = 2,
    Fall = 3,
}

impl MeteoSeason {
    /// Season of `month` (1-12); the southern hemisphere is shifted by six
    /// months.
    ///
    /// # Example
    /// ```
    /// use dayschedule::services::MeteoSeason;
    ///
    /// assert_eq!(MeteoSeason::for_month(4, false), MeteoSeason::Spring);
    /// assert_eq!(MeteoSeason::for_month(4, true), MeteoSeason::Fall);
    /// ```
    pub fn for_month(month: u32, southern: bool) -> Self {
        let month = if southern { (month + 5) % 12 + 1 } else { month };
        match month {
            3..=5 => MeteoSeason::Spring,
            6..=8 => MeteoSeason::Summer,
            9..=11 => MeteoSeason::Fall,
            _ => MeteoSeason::Winter,
        }
    }

    pub fn index(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            MeteoSeason::Winter => "Winter",
            MeteoSeason::Spring => "Spring",
            MeteoSeason::Summer => "Summer",
            MeteoSeason::Fall => "Fall",
        }
    }
}

impl fmt::Display for MeteoSeason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
