//! Month picker model.
//!
//! Grid-of-12 month selection with bounded year navigation. Selecting the
//! current calendar month always resolves to "track current" rather than a
//! pinned label, so downstream fetches fall back to the server's
//! current-month default.

use chrono::{Datelike, NaiveDate};

use crate::timefmt::month_label;

/// Navigation floor: years below this are unreachable.
pub const MIN_YEAR: i32 = 2018;

const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// What a selection resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Track the current month, auto-updating as it rolls over
    TrackCurrent,
    /// Pin a historical month until explicitly cleared
    Pinned(String),
}

impl Selection {
    /// The month parameter handed to the fetcher: `None` tracks current.
    #[must_use]
    pub fn month_param(&self) -> Option<&str> {
        match self {
            Self::TrackCurrent => None,
            Self::Pinned(label) => Some(label),
        }
    }
}

/// One cell of the month grid.
#[derive(Debug, Clone)]
pub struct MonthCell {
    /// 1-based month number
    pub month: u32,
    /// Abbreviated label, `Jan` through `Dec`
    pub label: &'static str,
    pub enabled: bool,
    pub selected: bool,
}

/// Month selection state: displayed grid year plus the pinned month.
#[derive(Debug, Clone)]
pub struct MonthPicker {
    year: i32,
    /// Pinned (year, month); `None` means tracking the current month
    pinned: Option<(i32, u32)>,
    min_year: i32,
    disable_future: bool,
}

impl MonthPicker {
    /// Picker starting on the current year, tracking the current month.
    #[must_use]
    pub fn new(today: NaiveDate) -> Self {
        Self {
            year: today.year(),
            pinned: None,
            min_year: MIN_YEAR,
            disable_future: true,
        }
    }

    /// Year currently shown in the grid.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Canonical label of the pinned month, if one is pinned.
    #[must_use]
    pub fn pinned_label(&self) -> Option<String> {
        self.pinned
            .and_then(|(year, month)| NaiveDate::from_ymd_opt(year, month, 1))
            .map(month_label)
    }

    #[must_use]
    pub fn can_prev_year(&self) -> bool {
        self.year > self.min_year
    }

    #[must_use]
    pub fn can_next_year(&self, today: NaiveDate) -> bool {
        !self.disable_future || self.year < today.year()
    }

    /// Navigate the grid one year back, clamped to the floor.
    pub fn prev_year(&mut self) {
        if self.can_prev_year() {
            self.year -= 1;
        }
    }

    /// Navigate the grid one year forward, clamped to the current year when
    /// future months are disabled.
    pub fn next_year(&mut self, today: NaiveDate) {
        if self.can_next_year(today) {
            self.year += 1;
        }
    }

    /// The 12 cells for the displayed year.
    #[must_use]
    pub fn cells(&self, today: NaiveDate) -> Vec<MonthCell> {
        (1..=12)
            .map(|month| {
                let is_future = (self.year, month) > (today.year(), today.month());
                let before_floor = self.year < self.min_year;
                // Future restriction takes over cell enablement entirely;
                // navigation already clamps at the floor.
                let enabled = if self.disable_future {
                    !is_future
                } else {
                    !before_floor
                };
                let selected = match self.pinned {
                    Some(pin) => pin == (self.year, month),
                    None => (self.year, month) == (today.year(), today.month()),
                };
                MonthCell {
                    month,
                    label: MONTH_ABBR[(month - 1) as usize],
                    enabled,
                    selected,
                }
            })
            .collect()
    }

    /// Select a month in the displayed year.
    ///
    /// Returns `None` when the cell is out of range or disabled. The current
    /// calendar month resolves to [`Selection::TrackCurrent`], never to its
    /// literal label.
    pub fn select(&mut self, month: u32, today: NaiveDate) -> Option<Selection> {
        if !(1..=12).contains(&month) {
            return None;
        }
        let cell_enabled = self
            .cells(today)
            .into_iter()
            .find(|cell| cell.month == month)
            .is_some_and(|cell| cell.enabled);
        if !cell_enabled {
            return None;
        }

        if (self.year, month) == (today.year(), today.month()) {
            self.pinned = None;
            return Some(Selection::TrackCurrent);
        }

        let label = month_label(NaiveDate::from_ymd_opt(self.year, month, 1)?);
        self.pinned = Some((self.year, month));
        Some(Selection::Pinned(label))
    }

    /// Clear any pinned month and snap the grid back to the current year.
    pub fn clear(&mut self, today: NaiveDate) {
        self.pinned = None;
        self.year = today.year();
    }
}
