use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, Month};

/// Column header line every bulletin carries after its date header.
pub const COLUMN_HEADER: &str = "Country|Currency|Amount|Code|Rate";

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// One data line of a bulletin, before conversion into an [`crate::ExchangeRate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulletinRecord {
    pub country: String,
    pub currency_name: String,
    /// Number of currency units the rate is quoted for (e.g. 100 JPY).
    pub amount: u32,
    pub code: String,
    pub rate: Decimal,
}

impl BulletinRecord {
    /// Rate for a single unit of the currency.
    pub fn unit_rate(&self) -> Decimal {
        self.rate / Decimal::from(self.amount)
    }

    pub fn to_line(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}",
            self.country, self.currency_name, self.amount, self.code, self.rate
        )
    }
}

/// A parsed daily bulletin. Records keep bulletin line order and are not
/// deduplicated by code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBulletin {
    #[serde(with = "iso_date")]
    pub date: Date,
    /// Publication ordinal within the year.
    pub sequence: u32,
    pub records: Vec<BulletinRecord>,
}

impl DailyBulletin {
    /// All records whose code matches `code`, ignoring case.
    pub fn find<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a BulletinRecord> + 'a {
        let code = code.trim();
        self.records
            .iter()
            .filter(move |record| record.code.eq_ignore_ascii_case(code))
    }

    /// Header line in the upstream `"23 Dec 2025 #248"` form.
    pub fn header_line(&self) -> String {
        format!(
            "{} {} {} #{}",
            self.date.day(),
            month_abbrev(self.date.month()),
            self.date.year(),
            self.sequence
        )
    }

    /// Serialize back into the upstream text format.
    pub fn to_text(&self) -> String {
        let mut lines = Vec::with_capacity(self.records.len() + 2);
        lines.push(self.header_line());
        lines.push(String::from(COLUMN_HEADER));
        lines.extend(self.records.iter().map(BulletinRecord::to_line));
        lines.join("\n")
    }
}

const fn month_abbrev(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}
