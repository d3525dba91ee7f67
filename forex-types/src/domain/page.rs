//! Page-window arithmetic over a historical date range.
//!
//! A range `start..=end` is cut into windows of `page_size` days. Every window
//! is contiguous with the previous one; only the last window may be shorter.

use std::fmt;

use chrono::{Days, NaiveDate};

/// One page of a historical query, resolved to concrete dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Why a page could not be resolved.
///
/// These are user-facing outcomes, not failures: the gateway answers them
/// with a successful advisory message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAdvisory {
    InvalidPage { total_pages: u64 },
    InvalidPageSize,
    InvalidDateRange,
}

impl fmt::Display for PageAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageAdvisory::InvalidPage { total_pages } => write!(
                f,
                "Invalid page number. Please use a page between 1 and {}.",
                total_pages
            ),
            PageAdvisory::InvalidPageSize => {
                write!(f, "Invalid page size. Please use a page size of at least 1.")
            }
            PageAdvisory::InvalidDateRange => write!(
                f,
                "Invalid date range. The end date must not be before the start date."
            ),
        }
    }
}

impl PageWindow {
    /// Resolves `page` (1-based) of the range `start..=end`.
    ///
    /// Any integer is accepted; values below 1 become advisories.
    pub fn compute(
        start: NaiveDate,
        end: NaiveDate,
        page: i64,
        page_size: i64,
    ) -> Result<Self, PageAdvisory> {
        let size = match u64::try_from(page_size) {
            Ok(size) if size > 0 => size,
            _ => return Err(PageAdvisory::InvalidPageSize),
        };
        if end < start {
            return Err(PageAdvisory::InvalidDateRange);
        }

        let total_days = (end - start).num_days().unsigned_abs() + 1;
        let total_pages = total_days.div_ceil(size);

        let page = match u64::try_from(page) {
            Ok(page) if (1..=total_pages).contains(&page) => page,
            _ => return Err(PageAdvisory::InvalidPage { total_pages }),
        };

        // page <= total_pages keeps the window start inside the range
        let window_start = (page - 1)
            .checked_mul(size)
            .and_then(|offset| start.checked_add_days(Days::new(offset)))
            .unwrap_or(end);
        let window_end = window_start
            .checked_add_days(Days::new(size - 1))
            .map_or(end, |d| d.min(end));

        Ok(Self {
            page,
            page_size: size,
            total_pages,
            start: window_start,
            end: window_end,
        })
    }
}
