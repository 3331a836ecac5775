//! Time handling: calendar breakdown of instants and day-offset windows.

pub mod date_context;

pub use date_context::{
    build_date_context, days_in_month, is_leap_year, parse_timezone, DateContext, DEFAULT_WINDOW,
    SECONDS_PER_DAY,
};
