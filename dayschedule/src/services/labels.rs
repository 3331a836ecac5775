//! Compass points and roman-numeral clock labels.

use serde::{Deserialize, Serialize};

const POINTS_4: [&str; 4] = ["N", "E", "S", "W"];
const POINTS_8: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
const POINTS_16: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Compass labels of an object above the horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompassReading {
    pub azimuth: f64,
    pub point4: String,
    pub point8: String,
    pub point16: String,
}

impl CompassReading {
    /// Labels for `azimuth` (degrees from north), or `None` when the object is
    /// below the horizon or either value is unknown.
    pub fn new(azimuth: Option<f64>, altitude: Option<f64>) -> Option<Self> {
        let azimuth = azimuth.filter(|a| a.is_finite())?;
        if altitude? < 0.0 {
            return None;
        }
        Some(Self {
            azimuth,
            point4: compass_point(azimuth, &POINTS_4).to_string(),
            point8: compass_point(azimuth, &POINTS_8).to_string(),
            point16: compass_point(azimuth, &POINTS_16).to_string(),
        })
    }
}

fn compass_point(azimuth: f64, points: &[&'static str]) -> &'static str {
    let n = points.len();
    let sector = 360.0 / n as f64;
    let idx = (azimuth.rem_euclid(360.0) / sector).round() as usize % n;
    points[idx]
}

/// Roman numeral for `n` in `1..=3999`; `N` (nulla) for zero.
pub fn roman_numeral(mut n: u32) -> String {
    const TABLE: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    if n == 0 {
        return "N".to_string();
    }
    let mut out = String::new();
    for (value, symbol) in TABLE {
        while n >= value {
            out.push_str(symbol);
            n -= value;
        }
    }
    out
}

/// Clock reading in roman numerals, 12-hour form.
///
/// Zero minute and second groups are left out. A zero minute before
/// nonzero seconds keeps its empty slot, so `IX::V` reads as 9:00:05.
///
/// # Example
/// ```
/// use dayschedule::services::labels::roman_clock;
///
/// assert_eq!(roman_clock(14, 30, 0), "II:XXX");
/// assert_eq!(roman_clock(0, 0, 0), "XII");
/// assert_eq!(roman_clock(9, 0, 5), "IX::V");
/// ```
pub fn roman_clock(hour: u32, minute: u32, second: u32) -> String {
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    let group = |n: u32| if n == 0 { String::new() } else { roman_numeral(n) };
    let mut parts = vec![roman_numeral(hour12)];
    if second != 0 {
        parts.push(group(minute));
        parts.push(group(second));
    } else if minute != 0 {
        parts.push(group(minute));
    }
    parts.join(":")
}
