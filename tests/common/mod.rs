#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, HashSet};
use timetable_solver::data::{
    Resource, SchoolClass, SchoolConfig, Subject, Teacher, Timetable, TimetableEntry,
};

pub fn subject(id: &str, name: &str) -> Subject {
    Subject {
        id: id.into(),
        name: name.into(),
        weekly_periods: 0,
        lab: false,
        double_period: false,
        resource_type: None,
    }
}

pub fn teacher(id: &str, subjects: &[&str], max_load: u32, days: usize, periods: usize) -> Teacher {
    Teacher {
        id: id.into(),
        name: id.into(),
        subjects: subjects.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
        max_load,
        availability: vec![vec![true; periods]; days],
    }
}

pub fn class(id: &str, subjects: &[(&str, u32)]) -> SchoolClass {
    SchoolClass {
        id: id.into(),
        name: id.to_uppercase(),
        subjects: subjects
            .iter()
            .map(|(s, n)| (s.to_string(), *n))
            .collect::<BTreeMap<_, _>>(),
    }
}

pub fn resource(id: &str, kind: &str, days: usize, periods: usize) -> Resource {
    Resource {
        id: id.into(),
        kind: kind.into(),
        availability: vec![vec![true; periods]; days],
    }
}

/// Three classes, six teachers, a science lab and a computer lab over a
/// five-day week of six periods.
pub fn school() -> SchoolConfig {
    let (days, periods) = (5, 6);

    let mut chemistry = subject("chem", "Chemistry");
    chemistry.lab = true;
    chemistry.double_period = true;
    let mut computing = subject("cs", "Computer Science");
    computing.lab = true;

    let mut math_part_time = teacher("t-math2", &["math"], 8, days, periods);
    math_part_time.availability[0] = vec![false; periods];
    let mut humanities = teacher("t-hum", &["hist", "art"], 12, days, periods);
    for day in humanities.availability.iter_mut() {
        day[periods - 1] = false;
    }
    let mut science_lab = resource("lab-1", "lab", days, periods);
    science_lab.availability[4] = vec![false; periods];

    SchoolConfig {
        working_days: days,
        periods_per_day: periods,
        subjects: vec![
            subject("math", "Mathematics"),
            subject("eng", "English"),
            chemistry,
            computing,
            subject("hist", "History"),
            subject("art", "Art"),
        ],
        teachers: vec![
            teacher("t-math1", &["math"], 10, days, periods),
            math_part_time,
            teacher("t-eng", &["eng"], 12, days, periods),
            teacher("t-sci", &["chem"], 10, days, periods),
            teacher("t-cs", &["cs"], 6, days, periods),
            humanities,
        ],
        classes: ["7a", "7b", "8a"]
            .iter()
            .map(|id| {
                class(
                    id,
                    &[("math", 5), ("eng", 4), ("chem", 1), ("cs", 2), ("hist", 2), ("art", 1)],
                )
            })
            .collect(),
        resources: vec![science_lab, resource("pc-1", "computer_lab", days, periods)],
    }
}

/// No teacher or resource in two classes at the same time.
pub fn assert_no_double_booking(timetable: &Timetable, config: &SchoolConfig) {
    for day in 0..config.working_days {
        for period in 0..config.periods_per_day {
            let mut teachers = HashSet::new();
            let mut resources = HashSet::new();
            for (class_id, grid) in timetable {
                let Some(lesson) = grid[day][period].as_ref().and_then(TimetableEntry::assignment)
                else {
                    continue;
                };
                assert!(
                    teachers.insert(lesson.teacher_id.clone()),
                    "teacher {} double-booked at day {day} period {period} (class {class_id})",
                    lesson.teacher_id
                );
                if let Some(resource_id) = &lesson.resource_id {
                    assert!(
                        resources.insert(resource_id.clone()),
                        "resource {resource_id} double-booked at day {day} period {period}"
                    );
                }
            }
        }
    }
}

/// Teachers and resources only used when available; teachers qualified.
pub fn assert_availability_respected(timetable: &Timetable, config: &SchoolConfig) {
    for grid in timetable.values() {
        for (day, row) in grid.iter().enumerate() {
            for (period, cell) in row.iter().enumerate() {
                let Some(lesson) = cell.as_ref().and_then(TimetableEntry::assignment) else {
                    continue;
                };
                let teacher = config
                    .teachers
                    .iter()
                    .find(|t| t.id == lesson.teacher_id)
                    .expect("lesson teacher is configured");
                assert!(teacher.availability[day][period]);
                assert!(teacher.subjects.contains(&lesson.subject_id));
                if let Some(resource_id) = &lesson.resource_id {
                    let resource = config
                        .resources
                        .iter()
                        .find(|r| &r.id == resource_id)
                        .expect("lesson resource is configured");
                    assert!(resource.availability[day][period]);
                }
            }
        }
    }
}

pub fn assert_loads_within_max(timetable: &Timetable, config: &SchoolConfig) {
    let mut loads: BTreeMap<&str, u32> = BTreeMap::new();
    for grid in timetable.values() {
        for cell in grid.iter().flatten() {
            if let Some(lesson) = cell.as_ref().and_then(TimetableEntry::assignment) {
                *loads.entry(lesson.teacher_id.as_str()).or_insert(0) += 1;
            }
        }
    }
    for teacher in &config.teachers {
        let load = loads.get(teacher.id.as_str()).copied().unwrap_or(0);
        assert!(load <= teacher.max_load, "{} teaches {load} > {}", teacher.id, teacher.max_load);
    }
}

/// Every weekly unit of demand is either placed or marked, exactly once.
pub fn assert_demand_conserved(timetable: &Timetable, config: &SchoolConfig) {
    for class in &config.classes {
        let mut units: BTreeMap<&str, u32> = BTreeMap::new();
        for cell in timetable[&class.id].iter().flatten().flatten() {
            if cell.is_head() {
                *units.entry(cell.subject_id()).or_insert(0) += 1;
            }
        }
        for (subject_id, count) in &class.subjects {
            assert_eq!(
                units.get(subject_id.as_str()).copied().unwrap_or(0),
                *count,
                "class {} subject {subject_id}",
                class.id
            );
        }
        assert_eq!(units.values().sum::<u32>(), class.subjects.values().sum::<u32>());
    }
}

/// Double cells come in head/tail pairs on the same day.
pub fn assert_doubles_paired(timetable: &Timetable) {
    for grid in timetable.values() {
        for row in grid {
            for (period, cell) in row.iter().enumerate() {
                let Some(lesson) = cell.as_ref().and_then(TimetableEntry::assignment) else {
                    continue;
                };
                if !lesson.double {
                    continue;
                }
                if lesson.is_tail() {
                    let head = period
                        .checked_sub(1)
                        .and_then(|p| row[p].as_ref())
                        .and_then(TimetableEntry::assignment)
                        .expect("tail has a head");
                    assert!(head.pairs_with(lesson));
                } else {
                    let tail = row
                        .get(period + 1)
                        .and_then(Option::as_ref)
                        .and_then(TimetableEntry::assignment)
                        .expect("head has a tail");
                    assert!(lesson.pairs_with(tail));
                }
            }
        }
    }
}

pub fn assert_hard_constraints(timetable: &Timetable, config: &SchoolConfig) {
    assert_no_double_booking(timetable, config);
    assert_availability_respected(timetable, config);
    assert_loads_within_max(timetable, config);
    assert_demand_conserved(timetable, config);
    assert_doubles_paired(timetable);
}
