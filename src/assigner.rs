use crate::data::{Assignment, Resource, SchoolConfig, Teacher};
use crate::index::DomainIndex;
use crate::occupancy::Slot;
use crate::requirements::Requirement;
use crate::timetable::{self, ScheduleState};
use log::{trace, warn};
use std::collections::HashMap;

/// Where a requirement ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Assigned(Slot),
    /// No feasible tuple anywhere; an unassigned marker holds the slot.
    Unassigned(Slot),
    /// Not even a free class slot was left for the marker.
    Dropped,
}

impl Placement {
    pub fn is_assigned(&self) -> bool {
        matches!(self, Placement::Assigned(_))
    }
}

/// First-fit construction over an initially empty timetable.
///
/// Commitments are never revisited; placement quality depends on the order
/// requirements are fed in.
pub struct GreedyAssigner<'a> {
    config: &'a SchoolConfig,
    index: &'a DomainIndex<'a>,
    state: ScheduleState,
    loads: HashMap<&'a str, u32>,
}

impl<'a> GreedyAssigner<'a> {
    pub fn new(config: &'a SchoolConfig, index: &'a DomainIndex<'a>) -> Self {
        Self {
            config,
            index,
            state: ScheduleState::new(config),
            loads: HashMap::new(),
        }
    }

    pub fn state(&self) -> &ScheduleState {
        &self.state
    }

    pub fn into_state(self) -> ScheduleState {
        self.state
    }

    /// Periods committed to `teacher_id` so far.
    pub fn load(&self, teacher_id: &str) -> u32 {
        self.loads.get(teacher_id).copied().unwrap_or(0)
    }

    /// Places one requirement, or records it as unassigned.
    pub fn assign(&mut self, requirement: &Requirement<'a>) -> Placement {
        if let Some((slot, teacher, resource)) = self.find_placement(requirement) {
            let lesson = Assignment::new(
                requirement.subject_id,
                &teacher.id,
                resource.map(|r| r.id.as_str()),
            );
            self.state.place(requirement.class_id, slot, &lesson);
            *self.loads.entry(teacher.id.as_str()).or_insert(0) += slot.span as u32;
            trace!(
                "Placed {}/{} with {} at day {} period {}.",
                requirement.class_id, requirement.subject_id, teacher.id, slot.day, slot.start
            );
            return Placement::Assigned(slot);
        }

        let free_slot = self.state.grid(requirement.class_id).and_then(|grid| {
            self.candidate_slots(requirement.span())
                .find(|slot| timetable::is_free(grid, *slot))
        });
        match free_slot {
            Some(slot) => {
                self.state
                    .mark_unassigned(requirement.class_id, slot, requirement.subject_id);
                trace!(
                    "No feasible placement for {}/{}; marked day {} period {} unassigned.",
                    requirement.class_id, requirement.subject_id, slot.day, slot.start
                );
                Placement::Unassigned(slot)
            }
            None => {
                warn!(
                    "Class {} has no free slot left for {}; requirement dropped.",
                    requirement.class_id, requirement.subject_id
                );
                Placement::Dropped
            }
        }
    }

    /// Day-major, then start period, every slot of `span` periods in the week.
    fn candidate_slots(&self, span: usize) -> impl Iterator<Item = Slot> {
        let periods_per_day = self.config.periods_per_day;
        (0..self.config.working_days).flat_map(move |day| {
            (0..(periods_per_day + 1).saturating_sub(span))
                .map(move |start| Slot::new(day, start, span))
        })
    }

    fn find_placement(
        &self,
        requirement: &Requirement<'a>,
    ) -> Option<(Slot, &'a Teacher, Option<&'a Resource>)> {
        let grid = self.state.grid(requirement.class_id)?;
        self.candidate_slots(requirement.span())
            .filter(|slot| timetable::is_free(grid, *slot))
            .find_map(|slot| {
                let teacher = self
                    .index
                    .teachers()
                    .find(|teacher| self.teacher_fits(teacher, requirement, slot))?;
                let resource = match requirement.resource_type {
                    Some(kind) => Some(self.find_resource(kind, slot)?),
                    None => None,
                };
                Some((slot, teacher, resource))
            })
    }

    fn teacher_fits(&self, teacher: &Teacher, requirement: &Requirement<'_>, slot: Slot) -> bool {
        teacher.subjects.contains(requirement.subject_id)
            && slot.periods().all(|p| teacher.availability[slot.day][p])
            && self.state.teacher_schedule.is_free(&teacher.id, slot)
            && self.load(&teacher.id) + slot.span as u32 <= teacher.max_load
    }

    fn find_resource(&self, kind: &str, slot: Slot) -> Option<&'a Resource> {
        self.index.resources_of(kind).iter().copied().find(|resource| {
            slot.periods().all(|p| resource.availability[slot.day][p])
                && self.state.resource_schedule.is_free(&resource.id, slot)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SchoolClass, Subject, TimetableEntry};
    use crate::requirements;
    use std::collections::{BTreeMap, BTreeSet};

    fn subject(id: &str, lab: bool, double_period: bool) -> Subject {
        Subject {
            id: id.into(),
            name: id.into(),
            weekly_periods: 0,
            lab,
            double_period,
            resource_type: None,
        }
    }

    fn teacher(id: &str, subjects: &[&str], max_load: u32, days: usize, periods: usize) -> Teacher {
        Teacher {
            id: id.into(),
            name: id.into(),
            subjects: subjects.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            max_load,
            availability: vec![vec![true; periods]; days],
        }
    }

    fn class(id: &str, subjects: &[(&str, u32)]) -> SchoolClass {
        SchoolClass {
            id: id.into(),
            name: id.into(),
            subjects: subjects
                .iter()
                .map(|(s, n)| (s.to_string(), *n))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn run(config: &SchoolConfig) -> (Vec<Placement>, ScheduleState) {
        let index = DomainIndex::build(config);
        let mut assigner = GreedyAssigner::new(config, &index);
        let placements = requirements::flatten(config, &index)
            .iter()
            .map(|r| assigner.assign(r))
            .collect();
        (placements, assigner.into_state())
    }

    #[test]
    fn fills_the_first_free_slots_in_order() {
        let config = SchoolConfig {
            working_days: 2,
            periods_per_day: 3,
            subjects: vec![subject("math", false, false)],
            teachers: vec![teacher("t1", &["math"], 10, 2, 3)],
            classes: vec![class("7a", &[("math", 2)])],
            resources: vec![],
        };
        let (placements, _) = run(&config);
        assert_eq!(
            placements,
            [
                Placement::Assigned(Slot::new(0, 0, 1)),
                Placement::Assigned(Slot::new(0, 1, 1)),
            ]
        );
    }

    #[test]
    fn skips_unavailable_periods_and_prefers_lower_teacher_ids() {
        let mut busy = teacher("a-teacher", &["math"], 10, 1, 3);
        busy.availability[0][0] = false;
        let config = SchoolConfig {
            working_days: 1,
            periods_per_day: 3,
            subjects: vec![subject("math", false, false)],
            teachers: vec![teacher("z-teacher", &["math"], 10, 1, 3), busy],
            classes: vec![class("7a", &[("math", 2)])],
            resources: vec![],
        };
        let (_, state) = run(&config);
        let grid = state.grid("7a").unwrap();
        let teacher_at = |p: usize| {
            grid[0][p]
                .as_ref()
                .and_then(TimetableEntry::assignment)
                .map(|a| a.teacher_id.clone())
        };
        assert_eq!(teacher_at(0).as_deref(), Some("z-teacher"));
        assert_eq!(teacher_at(1).as_deref(), Some("a-teacher"));
    }

    #[test]
    fn doubles_need_two_adjacent_free_periods() {
        let mut t = teacher("t1", &["chem"], 10, 1, 3);
        t.availability[0][1] = false;
        let config = SchoolConfig {
            working_days: 1,
            periods_per_day: 3,
            subjects: vec![subject("chem", false, true)],
            teachers: vec![t],
            classes: vec![class("7a", &[("chem", 1)])],
            resources: vec![],
        };
        let (placements, state) = run(&config);
        assert_eq!(placements, [Placement::Unassigned(Slot::new(0, 0, 2))]);
        let grid = state.grid("7a").unwrap();
        assert!(grid[0][0].as_ref().is_some_and(TimetableEntry::is_unassigned));
        assert!(grid[0][1].as_ref().is_some_and(TimetableEntry::is_unassigned));
        assert!(grid[0][2].is_none());
    }

    #[test]
    fn lab_subjects_take_the_first_free_lab() {
        let lab = |id: &str| Resource {
            id: id.into(),
            kind: "lab".into(),
            availability: vec![vec![true; 1]; 1],
        };
        let config = SchoolConfig {
            working_days: 1,
            periods_per_day: 1,
            subjects: vec![subject("bio", true, false)],
            teachers: vec![teacher("t1", &["bio"], 10, 1, 1), teacher("t2", &["bio"], 10, 1, 1)],
            classes: vec![class("7a", &[("bio", 1)]), class("8b", &[("bio", 1)])],
            resources: vec![lab("lab-1"), lab("lab-2")],
        };
        let (placements, state) = run(&config);
        assert!(placements.iter().all(Placement::is_assigned));
        assert!(state.resource_schedule.is_busy("lab-1", 0, 0));
        assert!(state.resource_schedule.is_busy("lab-2", 0, 0));
    }

    #[test]
    fn max_load_caps_teacher_assignments() {
        let config = SchoolConfig {
            working_days: 1,
            periods_per_day: 4,
            subjects: vec![subject("math", false, false)],
            teachers: vec![teacher("t1", &["math"], 3, 1, 4)],
            classes: vec![class("7a", &[("math", 4)])],
            resources: vec![],
        };
        let index = DomainIndex::build(&config);
        let mut assigner = GreedyAssigner::new(&config, &index);
        let placements: Vec<Placement> = requirements::flatten(&config, &index)
            .iter()
            .map(|r| assigner.assign(r))
            .collect();
        assert_eq!(placements.iter().filter(|p| p.is_assigned()).count(), 3);
        assert_eq!(placements[3], Placement::Unassigned(Slot::new(0, 3, 1)));
        assert_eq!(assigner.load("t1"), 3);
    }

    #[test]
    fn requirements_are_dropped_when_the_class_grid_is_full() {
        let config = SchoolConfig {
            working_days: 1,
            periods_per_day: 1,
            subjects: vec![subject("math", false, false)],
            teachers: vec![teacher("t1", &["math"], 10, 1, 1)],
            classes: vec![class("7a", &[("math", 2)])],
            resources: vec![],
        };
        let (placements, _) = run(&config);
        assert_eq!(placements, [Placement::Assigned(Slot::new(0, 0, 1)), Placement::Dropped]);
    }
}
