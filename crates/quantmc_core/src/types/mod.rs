//! Core value types: dates, calendars, day counts and currencies.

pub mod calendar;
pub mod currency;
pub mod currency_pair;
pub mod error;
pub mod time;

pub use calendar::Calendar;
pub use currency::Currency;
pub use currency_pair::CurrencyPair;
pub use error::{CurrencyError, DateError};
pub use time::{Date, DayCount};
