use crate::data::{SchoolConfig, Subject};
use crate::index::DomainIndex;
use itertools::Itertools;
use std::cmp::Ordering;

/// One unit of weekly demand for a class-subject pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement<'a> {
    pub class_id: &'a str,
    pub subject_id: &'a str,
    pub requires_double: bool,
    pub resource_type: Option<&'a str>,
    /// The subject's nominal weekly periods; only used for ordering.
    pub weekly_periods: u32,
}

impl Requirement<'_> {
    /// Number of consecutive periods this requirement claims.
    pub fn span(&self) -> usize {
        if self.requires_double { 2 } else { 1 }
    }
}

/// Resource type a subject needs, if any.
///
/// An explicit `resourceType` wins; lab subjects otherwise need a
/// `computer_lab` when their name mentions computers and a `lab` if not.
pub fn resource_type_of(subject: &Subject) -> Option<&str> {
    if let Some(kind) = subject.resource_type.as_deref() {
        return Some(kind);
    }
    if !subject.lab {
        return None;
    }
    if subject.name.to_lowercase().contains("computer") {
        Some("computer_lab")
    } else {
        Some("lab")
    }
}

/// Hardest requirements first: doubles, then resource-bound, then by
/// weekly count, with ids breaking ties.
fn placement_order(a: &Requirement<'_>, b: &Requirement<'_>) -> Ordering {
    b.requires_double
        .cmp(&a.requires_double)
        .then_with(|| b.resource_type.is_some().cmp(&a.resource_type.is_some()))
        .then_with(|| b.weekly_periods.cmp(&a.weekly_periods))
        .then_with(|| a.class_id.cmp(b.class_id))
        .then_with(|| a.subject_id.cmp(b.subject_id))
}

/// Expands every class's weekly subject counts into requirements, in the
/// order the greedy assigner should place them.
pub fn flatten<'a>(config: &'a SchoolConfig, index: &DomainIndex<'a>) -> Vec<Requirement<'a>> {
    config
        .classes
        .iter()
        .flat_map(|class| {
            class.subjects.iter().flat_map(move |(subject_id, &count)| {
                let subject = index.subject(subject_id);
                let requirement = Requirement {
                    class_id: class.id.as_str(),
                    subject_id: subject_id.as_str(),
                    requires_double: subject.is_some_and(|s| s.double_period),
                    resource_type: subject.and_then(resource_type_of),
                    weekly_periods: subject.map_or(0, |s| s.weekly_periods),
                };
                std::iter::repeat_n(requirement, count as usize)
            })
        })
        .sorted_by(placement_order)
        .collect()
}
