//! Seeded pair-swap local search.
//!
//! # Algorithm
//!
//! 1. Pool every placed lesson (double periods once, by their head cell).
//! 2. Draw two pool entries with the injected generator.
//! 3. Check that exchanging their positions keeps every hard constraint.
//! 4. Apply the swap on copies of the affected grids and re-score the
//!    whole timetable.
//! 5. Keep it on strict improvement, roll it back otherwise.
//!
//! Lessons of different classes are only exchanged when they teach the same
//! subject, so each class keeps its weekly subject counts.

use crate::data::{Assignment, ClassId, Grid, PenaltyWeights, SchoolConfig};
use crate::diagnostics::compute_diagnostics;
use crate::index::DomainIndex;
use crate::occupancy::{Occupancy, Slot};
use crate::rng::pick_index;
use crate::timetable::{self, ScheduleState};
use log::{debug, trace};
use rand::RngCore;

/// A lesson in the swap pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedLesson {
    pub class_id: ClassId,
    pub slot: Slot,
    pub lesson: Assignment,
}

impl PlacedLesson {
    fn covers(&self, class_id: &str, day: usize, period: usize) -> bool {
        self.class_id == class_id && self.slot.covers(day, period)
    }
}

/// Positions two pooled lessons move to when swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapMove {
    /// Where the first lesson goes, in the second lesson's class.
    pub first_to: Slot,
    /// Where the second lesson goes, in the first lesson's class.
    pub second_to: Slot,
}

/// Counters of one optimizer run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    pub iterations: usize,
    pub same_slot_draws: usize,
    pub infeasible: usize,
    pub accepted: usize,
    pub initial_penalty: u64,
    pub best_penalty: u64,
}

/// Collects the swap pool in class, day, period order.
pub fn collect_pool(state: &ScheduleState) -> Vec<PlacedLesson> {
    timetable::lessons(&state.timetable)
        .map(|(class_id, slot, lesson)| PlacedLesson {
            class_id: class_id.clone(),
            slot,
            lesson: lesson.clone(),
        })
        .collect()
}

pub struct LocalSearch<'a, R> {
    config: &'a SchoolConfig,
    index: &'a DomainIndex<'a>,
    weights: PenaltyWeights,
    rng: R,
}

impl<'a, R: RngCore> LocalSearch<'a, R> {
    pub fn new(
        config: &'a SchoolConfig,
        index: &'a DomainIndex<'a>,
        weights: PenaltyWeights,
        rng: R,
    ) -> Self {
        Self {
            config,
            index,
            weights,
            rng,
        }
    }

    pub fn into_rng(self) -> R {
        self.rng
    }

    fn penalty(&self, state: &ScheduleState) -> u64 {
        compute_diagnostics(&state.timetable, self.config, &self.weights).penalty_score
    }

    /// Improves `state` in place for at most `iterations` draws.
    ///
    /// A draw that picks the same lesson twice still uses up its iteration.
    pub fn run(&mut self, state: &mut ScheduleState, iterations: usize) -> SearchOutcome {
        let initial_penalty = self.penalty(state);
        let mut outcome = SearchOutcome {
            initial_penalty,
            best_penalty: initial_penalty,
            ..SearchOutcome::default()
        };

        for iteration in 0..iterations {
            let pool = collect_pool(state);
            if pool.len() < 2 {
                trace!("Swap pool has {} lessons; stopping.", pool.len());
                break;
            }
            outcome.iterations += 1;

            let first = &pool[pick_index(&mut self.rng, pool.len())];
            let second = &pool[pick_index(&mut self.rng, pool.len())];
            if first == second {
                outcome.same_slot_draws += 1;
                continue;
            }

            let Some(swap) = self.check_swap(state, first, second) else {
                outcome.infeasible += 1;
                continue;
            };

            let snapshot = Snapshot::take(state, first, second);
            apply_swap(state, first, second, swap);
            let penalty = self.penalty(state);
            if penalty < outcome.best_penalty {
                debug!(
                    "Iteration {}: swapped {}@{:?} with {}@{:?}, penalty {} -> {}.",
                    iteration,
                    first.class_id,
                    first.slot,
                    second.class_id,
                    second.slot,
                    outcome.best_penalty,
                    penalty
                );
                outcome.best_penalty = penalty;
                outcome.accepted += 1;
            } else {
                snapshot.restore(state, first, second, swap);
            }
        }

        outcome
    }

    /// Destinations of the swap if it keeps every hard constraint.
    pub fn check_swap(
        &self,
        state: &ScheduleState,
        first: &PlacedLesson,
        second: &PlacedLesson,
    ) -> Option<SwapMove> {
        if first.class_id != second.class_id
            && first.lesson.subject_id != second.lesson.subject_id
        {
            return None;
        }

        let swap = SwapMove {
            first_to: Slot::new(second.slot.day, second.slot.start, first.slot.span),
            second_to: Slot::new(first.slot.day, first.slot.start, second.slot.span),
        };
        let periods_per_day = self.config.periods_per_day;
        if swap.first_to.end() > periods_per_day || swap.second_to.end() > periods_per_day {
            return None;
        }

        // Cells being vacated by the pair count as free.
        let vacated = |class_id: &str, day: usize, period: usize| {
            first.covers(class_id, day, period) || second.covers(class_id, day, period)
        };
        let lands = |class_id: &str, slot: Slot| {
            let Some(grid) = state.grid(class_id) else {
                return false;
            };
            slot.periods()
                .all(|p| grid[slot.day][p].is_none() || vacated(class_id, slot.day, p))
        };
        if !lands(&second.class_id, swap.first_to) || !lands(&first.class_id, swap.second_to) {
            return None;
        }
        if first.class_id == second.class_id && swap.first_to.overlaps(&swap.second_to) {
            return None;
        }

        // After the swap the two lessons may not share a teacher or resource
        // at overlapping times.
        if swap.first_to.overlaps(&swap.second_to) {
            let shares_resource = first.lesson.resource_id.is_some()
                && first.lesson.resource_id == second.lesson.resource_id;
            if first.lesson.teacher_id == second.lesson.teacher_id || shares_resource {
                return None;
            }
        }

        let fits = |placed: &PlacedLesson, to: Slot| {
            self.teacher_can_take(state, placed, to, first, second)
                && self.resource_can_take(state, placed, to, first, second)
        };
        (fits(first, swap.first_to) && fits(second, swap.second_to)).then_some(swap)
    }

    fn teacher_can_take(
        &self,
        state: &ScheduleState,
        placed: &PlacedLesson,
        to: Slot,
        first: &PlacedLesson,
        second: &PlacedLesson,
    ) -> bool {
        let Some(teacher) = self.index.teacher(&placed.lesson.teacher_id) else {
            return false;
        };
        to.periods().all(|p| teacher.availability[to.day][p])
            && is_free_apart_from(
                &state.teacher_schedule,
                &teacher.id,
                to,
                [first, second]
                    .into_iter()
                    .filter(|other| other.lesson.teacher_id == teacher.id),
            )
    }

    fn resource_can_take(
        &self,
        state: &ScheduleState,
        placed: &PlacedLesson,
        to: Slot,
        first: &PlacedLesson,
        second: &PlacedLesson,
    ) -> bool {
        let Some(resource_id) = placed.lesson.resource_id.as_deref() else {
            return true;
        };
        let Some(resource) = self.index.resource(resource_id) else {
            return false;
        };
        to.periods().all(|p| resource.availability[to.day][p])
            && is_free_apart_from(
                &state.resource_schedule,
                resource_id,
                to,
                [first, second]
                    .into_iter()
                    .filter(|other| other.lesson.resource_id.as_deref() == Some(resource_id)),
            )
    }
}

/// Whether `id` is free during `slot` once `leaving` lessons have moved out.
fn is_free_apart_from<'p>(
    occupancy: &Occupancy,
    id: &str,
    slot: Slot,
    leaving: impl Iterator<Item = &'p PlacedLesson> + Clone,
) -> bool {
    slot.periods().all(|p| {
        !occupancy.is_busy(id, slot.day, p)
            || leaving.clone().any(|other| other.slot.covers(slot.day, p))
    })
}

/// Moves both lessons to their swap destinations.
fn apply_swap(
    state: &mut ScheduleState,
    first: &PlacedLesson,
    second: &PlacedLesson,
    swap: SwapMove,
) {
    state.remove(&first.class_id, first.slot, &first.lesson);
    state.remove(&second.class_id, second.slot, &second.lesson);
    state.place(&second.class_id, swap.first_to, &first.lesson);
    state.place(&first.class_id, swap.second_to, &second.lesson);
}

/// Copies of the one or two grids a swap touches.
struct Snapshot {
    first: Grid,
    second: Option<Grid>,
}

impl Snapshot {
    fn take(state: &ScheduleState, first: &PlacedLesson, second: &PlacedLesson) -> Self {
        let copy = |class_id: &str| state.grid(class_id).cloned().unwrap_or_default();
        Self {
            first: copy(&first.class_id),
            second: (first.class_id != second.class_id).then(|| copy(&second.class_id)),
        }
    }

    /// Puts the grids back and reverses the occupancy bookings of the swap.
    fn restore(
        self,
        state: &mut ScheduleState,
        first: &PlacedLesson,
        second: &PlacedLesson,
        swap: SwapMove,
    ) {
        state.release(swap.first_to, &first.lesson);
        state.release(swap.second_to, &second.lesson);
        state.book(first.slot, &first.lesson);
        state.book(second.slot, &second.lesson);

        state.timetable.insert(first.class_id.clone(), self.first);
        if let Some(grid) = self.second {
            state.timetable.insert(second.class_id.clone(), grid);
        }
    }
}
