//! # Domain Models
//!
//! Value types shared by the parser, the provider, and callers.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Currency`] | Validated, upper-cased 3-letter code |
//! | [`ExchangeRate`] | Positive rate of one source unit in the quote currency |
//! | [`BulletinRecord`] | One data line of a bulletin |
//! | [`DailyBulletin`] | Parsed bulletin: date, sequence, ordered records |
//!
//! All types are immutable once constructed and carry no shared state.

mod bulletin;
mod currency;
mod rate;

pub use bulletin::{BulletinRecord, DailyBulletin, COLUMN_HEADER};
pub use currency::Currency;
pub use rate::ExchangeRate;
