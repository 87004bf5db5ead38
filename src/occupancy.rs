use crate::data::{Day, Period};
use std::collections::{BTreeSet, HashMap};
use std::ops::Range;

/// A run of consecutive periods on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub day: Day,
    pub start: Period,
    pub span: usize,
}

impl Slot {
    pub fn new(day: Day, start: Period, span: usize) -> Self {
        Self { day, start, span }
    }

    pub fn periods(&self) -> Range<Period> {
        self.start..self.start + self.span
    }

    pub fn end(&self) -> Period {
        self.start + self.span
    }

    pub fn covers(&self, day: Day, period: Period) -> bool {
        self.day == day && self.periods().contains(&period)
    }

    pub fn overlaps(&self, other: &Slot) -> bool {
        self.day == other.day && self.start < other.end() && other.start < self.end()
    }
}

/// Busy periods per id and day, for teachers or resources.
///
/// This is a cache of what the timetable already says; every grid mutation
/// books or releases here in the same step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Occupancy {
    busy: HashMap<String, HashMap<Day, BTreeSet<Period>>>,
}

impl Occupancy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self, id: &str, day: Day, period: Period) -> bool {
        self.busy
            .get(id)
            .and_then(|days| days.get(&day))
            .is_some_and(|periods| periods.contains(&period))
    }

    pub fn is_free(&self, id: &str, slot: Slot) -> bool {
        slot.periods().all(|p| !self.is_busy(id, slot.day, p))
    }

    pub fn book(&mut self, id: &str, slot: Slot) {
        self.busy
            .entry(id.to_string())
            .or_default()
            .entry(slot.day)
            .or_default()
            .extend(slot.periods());
    }

    /// Frees `slot`; ids and days left without busy periods are dropped so
    /// that two equivalent tables compare equal.
    pub fn release(&mut self, id: &str, slot: Slot) {
        let Some(days) = self.busy.get_mut(id) else {
            return;
        };
        if let Some(periods) = days.get_mut(&slot.day) {
            for period in slot.periods() {
                periods.remove(&period);
            }
            if periods.is_empty() {
                days.remove(&slot.day);
            }
        }
        if days.is_empty() {
            self.busy.remove(id);
        }
    }

    /// Total busy periods of `id` across the week.
    pub fn load(&self, id: &str) -> usize {
        self.busy
            .get(id)
            .map(|days| days.values().map(BTreeSet::len).sum())
            .unwrap_or(0)
    }
}
