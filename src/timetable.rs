use crate::data::{
    Assignment, ClassId, Grid, SchoolConfig, Timetable, TimetableEntry, UnassignedMarker,
};
use crate::occupancy::{Occupancy, Slot};

pub fn empty_grid(working_days: usize, periods_per_day: usize) -> Grid {
    vec![vec![None; periods_per_day]; working_days]
}

pub fn is_free(grid: &Grid, slot: Slot) -> bool {
    slot.periods().all(|p| grid[slot.day][p].is_none())
}

/// Writes `entry` over every period of `slot`, flagging double halves.
pub fn write(grid: &mut Grid, slot: Slot, entry: &TimetableEntry) {
    for (offset, period) in slot.periods().enumerate() {
        grid[slot.day][period] = Some(entry.part(slot.span, offset));
    }
}

pub fn clear(grid: &mut Grid, slot: Slot) {
    for period in slot.periods() {
        grid[slot.day][period] = None;
    }
}

/// Every placed lesson, once per lesson: double tails are skipped.
///
/// Classes come in id order, then days, then periods.
pub fn lessons(timetable: &Timetable) -> impl Iterator<Item = (&ClassId, Slot, &Assignment)> {
    timetable.iter().flat_map(|(class_id, grid)| {
        grid.iter().enumerate().flat_map(move |(day, row)| {
            row.iter().enumerate().filter_map(move |(period, cell)| {
                let lesson = cell.as_ref()?.assignment()?;
                let slot = Slot::new(day, period, lesson.span());
                (!lesson.is_tail()).then_some((class_id, slot, lesson))
            })
        })
    })
}

/// A timetable together with the teacher and resource occupancy it implies.
///
/// All mutations go through this type so the occupancy tables never drift
/// from the grids.
#[derive(Debug, Clone, Default)]
pub struct ScheduleState {
    pub timetable: Timetable,
    pub teacher_schedule: Occupancy,
    pub resource_schedule: Occupancy,
}

impl ScheduleState {
    /// An empty grid for every configured class.
    pub fn new(config: &SchoolConfig) -> Self {
        let timetable = config
            .classes
            .iter()
            .map(|class| {
                (
                    class.id.clone(),
                    empty_grid(config.working_days, config.periods_per_day),
                )
            })
            .collect();
        Self {
            timetable,
            ..Self::default()
        }
    }

    /// Rebuilds the occupancy tables from an existing timetable.
    pub fn from_timetable(timetable: Timetable) -> Self {
        let mut teacher_schedule = Occupancy::new();
        let mut resource_schedule = Occupancy::new();
        for (_, slot, lesson) in lessons(&timetable) {
            teacher_schedule.book(&lesson.teacher_id, slot);
            if let Some(resource_id) = &lesson.resource_id {
                resource_schedule.book(resource_id, slot);
            }
        }
        Self {
            timetable,
            teacher_schedule,
            resource_schedule,
        }
    }

    pub fn grid(&self, class_id: &str) -> Option<&Grid> {
        self.timetable.get(class_id)
    }

    /// Writes `lesson` into the class grid and books its teacher and resource.
    pub fn place(&mut self, class_id: &str, slot: Slot, lesson: &Assignment) {
        if let Some(grid) = self.timetable.get_mut(class_id) {
            write(grid, slot, &TimetableEntry::Assigned(lesson.clone()));
        }
        self.book(slot, lesson);
    }

    /// Clears `lesson` from the class grid and releases its bookings.
    pub fn remove(&mut self, class_id: &str, slot: Slot, lesson: &Assignment) {
        if let Some(grid) = self.timetable.get_mut(class_id) {
            clear(grid, slot);
        }
        self.release(slot, lesson);
    }

    pub fn mark_unassigned(&mut self, class_id: &str, slot: Slot, subject_id: &str) {
        if let Some(grid) = self.timetable.get_mut(class_id) {
            write(grid, slot, &TimetableEntry::Unassigned(UnassignedMarker::new(subject_id)));
        }
    }

    pub(crate) fn book(&mut self, slot: Slot, lesson: &Assignment) {
        self.teacher_schedule.book(&lesson.teacher_id, slot);
        if let Some(resource_id) = &lesson.resource_id {
            self.resource_schedule.book(resource_id, slot);
        }
    }

    pub(crate) fn release(&mut self, slot: Slot, lesson: &Assignment) {
        self.teacher_schedule.release(&lesson.teacher_id, slot);
        if let Some(resource_id) = &lesson.resource_id {
            self.resource_schedule.release(resource_id, slot);
        }
    }

    pub fn into_timetable(self) -> Timetable {
        self.timetable
    }
}
