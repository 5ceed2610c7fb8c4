//! Static calendars (promotional events, federal holidays) and synthetic
//! sample data used by the `demo` command and end-to-end tests.

pub mod events;
pub mod holidays;
pub mod sample;

pub use events::EventCalendar;
pub use holidays::{HolidayTable, federal_holidays_from_2022};
pub use sample::generate_sample_purchases;
