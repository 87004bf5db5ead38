//! Soft-constraint scoring of a complete timetable.
//!
//! The evaluator is a pure function of the timetable: it keeps no state
//! between calls and is safe to run after every trial move.
//!
//! | Violation | Default weight |
//! |-----------|----------------|
//! | Unassigned marker (per cell) | 20 |
//! | Same subject in periods p and p + 1 of a class, outside one double | 10 |
//! | Teacher busy, free, busy within a day | 5 |

use crate::data::{Day, Diagnostics, PenaltyWeights, SchoolConfig, Timetable, TimetableEntry};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Scores `timetable` with the default [`PenaltyWeights`].
///
/// This is the read-only hook for callers that only want to display the
/// quality of a stored timetable.
pub fn compute_penalty(timetable: &Timetable, config: &SchoolConfig) -> Diagnostics {
    compute_diagnostics(timetable, config, &PenaltyWeights::default())
}

pub fn compute_diagnostics(
    timetable: &Timetable,
    config: &SchoolConfig,
    weights: &PenaltyWeights,
) -> Diagnostics {
    let mut unassigned_count = 0;
    // Weights come from callers; the score saturates instead of wrapping.
    let mut penalty_score: u64 = 0;
    let mut teacher_loads: BTreeMap<String, u32> =
        config.teachers.iter().map(|t| (t.id.clone(), 0)).collect();
    let mut teacher_days: HashMap<(&str, Day), BTreeSet<usize>> = HashMap::new();

    for grid in timetable.values() {
        for (day, row) in grid.iter().enumerate() {
            for (period, cell) in row.iter().enumerate() {
                match cell {
                    None => {}
                    Some(TimetableEntry::Unassigned(_)) => {
                        unassigned_count += 1;
                        penalty_score = penalty_score.saturating_add(weights.unassigned);
                    }
                    Some(TimetableEntry::Assigned(lesson)) => {
                        *teacher_loads.entry(lesson.teacher_id.clone()).or_insert(0) += 1;
                        teacher_days
                            .entry((lesson.teacher_id.as_str(), day))
                            .or_default()
                            .insert(period);
                    }
                }
            }

            for pair in row.windows(2) {
                let [Some(TimetableEntry::Assigned(a)), Some(TimetableEntry::Assigned(b))] = pair
                else {
                    continue;
                };
                if a.subject_id == b.subject_id && !a.pairs_with(b) {
                    penalty_score = penalty_score.saturating_add(weights.adjacency);
                }
            }
        }
    }

    for periods in teacher_days.values() {
        let busy: Vec<bool> = (0..config.periods_per_day)
            .map(|p| periods.contains(&p))
            .collect();
        let gaps = busy
            .windows(3)
            .filter(|w| matches!(w, [true, false, true]))
            .count() as u64;
        penalty_score = penalty_score.saturating_add(gaps.saturating_mul(weights.idle_gap));
    }

    Diagnostics {
        unassigned_count,
        penalty_score,
        teacher_loads,
    }
}
