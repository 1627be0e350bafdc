use chrono::{Datelike, NaiveDate};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One monthly credit-card statement cycle, "MM/YYYY" on the wire.
///
/// Field order matters: the derived ordering sorts by year first, so
/// `12/2024 < 01/2025`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InvoiceMonth {
    pub year: i32,
    pub month: u32,
}

impl InvoiceMonth {
    pub fn new(month: u32, year: i32) -> Option<Self> {
        (1..=12).contains(&month).then_some(InvoiceMonth { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        InvoiceMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The bucket `n` months after this one.
    pub fn plus(self, n: u32) -> Self {
        let total = self.year * 12 + (self.month as i32 - 1) + n as i32;
        InvoiceMonth {
            year: total.div_euclid(12),
            month: total.rem_euclid(12) as u32 + 1,
        }
    }

    /// The bucket `n` months before this one.
    pub fn minus(self, n: u32) -> Self {
        let total = self.year * 12 + (self.month as i32 - 1) - n as i32;
        InvoiceMonth {
            year: total.div_euclid(12),
            month: total.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap()
    }

    /// This month at `day`, clamped to the last day when the month is
    /// shorter (dueDay 31 in February lands on the 28th/29th).
    pub fn at_day(self, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
            .unwrap_or_else(|| last_day_of_month(self.year, self.month))
    }
}

impl fmt::Display for InvoiceMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid invoice month: {0:?} (expected MM/YYYY)")]
pub struct ParseInvoiceMonthError(String);

impl FromStr for InvoiceMonth {
    type Err = ParseInvoiceMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ParseInvoiceMonthError(s.to_string());
        let (m, y) = s.trim().split_once('/').ok_or_else(bad)?;
        let month: u32 = m.trim().parse().map_err(|_| bad())?;
        let year: i32 = y.trim().parse().map_err(|_| bad())?;
        InvoiceMonth::new(month, year).ok_or_else(bad)
    }
}

impl Serialize for InvoiceMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for InvoiceMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// `date` shifted forward by `months`, the day clamped to the end of the
/// target month (Jan 31 + 1 month = Feb 28/29).
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    let total = date.year() * 12 + date.month0() as i32 + months as i32;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, date.day())
        .unwrap_or_else(|| last_day_of_month(year, month))
}

fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next.and_then(|d| d.pred_opt()).unwrap()
}
