use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::ConfigError;

// Type aliases for clarity
pub type SubjectId = String;
pub type TeacherId = String;
pub type ClassId = String;
pub type ResourceId = String;
pub type Day = usize;
pub type Period = usize;

/// `availability[day][period]`, `true` when the slot can be used.
pub type Availability = Vec<Vec<bool>>;

/// A subject that classes take for a number of periods per week.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    #[serde(default)]
    pub weekly_periods: u32,
    #[serde(default)]
    pub lab: bool,
    #[serde(default)]
    pub double_period: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
}

/// A teacher, the subjects they are qualified for and when they can teach.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: TeacherId,
    pub name: String,
    pub subjects: BTreeSet<SubjectId>,
    pub max_load: u32,
    pub availability: Availability,
}

/// A class (group of students) with its weekly period count per subject.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolClass {
    pub id: ClassId,
    pub name: String,
    pub subjects: BTreeMap<SubjectId, u32>,
}

/// A bookable room or piece of equipment, e.g. a lab.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: ResourceId,
    #[serde(rename = "type")]
    pub kind: String,
    pub availability: Availability,
}

/// The complete school configuration the timetable is generated from.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolConfig {
    pub working_days: usize,
    pub periods_per_day: usize,
    pub subjects: Vec<Subject>,
    pub teachers: Vec<Teacher>,
    pub classes: Vec<SchoolClass>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

impl SchoolConfig {
    /// Checks the dimensions the engine indexes by.
    ///
    /// The engine itself trusts its input; this is meant for callers that
    /// receive configurations from outside, like the HTTP service.
    pub fn check_shape(&self) -> Result<(), ConfigError> {
        if self.working_days == 0 || self.periods_per_day == 0 {
            return Err(ConfigError::EmptyWeek);
        }
        let teachers = self
            .teachers
            .iter()
            .map(|t| ("teacher", &t.id, &t.availability));
        let resources = self
            .resources
            .iter()
            .map(|r| ("resource", &r.id, &r.availability));
        for (owner, id, availability) in teachers.chain(resources) {
            if !self.fits_week(availability) {
                return Err(ConfigError::Availability {
                    owner,
                    id: id.clone(),
                    days: self.working_days,
                    periods: self.periods_per_day,
                });
            }
        }
        Ok(())
    }

    /// Checks that every grid of `timetable` has the configured dimensions.
    pub fn check_timetable_shape(&self, timetable: &Timetable) -> Result<(), ConfigError> {
        match timetable.iter().find(|(_, grid)| !self.fits_week(grid)) {
            Some((class_id, _)) => Err(ConfigError::GridShape(class_id.clone())),
            None => Ok(()),
        }
    }

    fn fits_week<T>(&self, rows: &[Vec<T>]) -> bool {
        rows.len() == self.working_days && rows.iter().all(|row| row.len() == self.periods_per_day)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A lesson placed in a class grid.
///
/// Double periods are written to two adjacent cells; the first carries
/// `headOfDouble = true`, the second `headOfDouble = false`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub subject_id: SubjectId,
    pub teacher_id: TeacherId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<ResourceId>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub double: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_of_double: Option<bool>,
}

impl Assignment {
    pub fn new(subject_id: &str, teacher_id: &str, resource_id: Option<&str>) -> Self {
        Self {
            subject_id: subject_id.to_string(),
            teacher_id: teacher_id.to_string(),
            resource_id: resource_id.map(str::to_string),
            double: false,
            head_of_double: None,
        }
    }

    /// Number of consecutive periods this lesson occupies.
    pub fn span(&self) -> usize {
        if self.double { 2 } else { 1 }
    }

    /// True for the second cell of a double period.
    pub fn is_tail(&self) -> bool {
        self.double && self.head_of_double == Some(false)
    }

    /// Whether `self` at period p and `next` at p + 1 are the two halves of
    /// one double period.
    pub fn pairs_with(&self, next: &Assignment) -> bool {
        self.double
            && next.double
            && self.head_of_double == Some(true)
            && next.head_of_double == Some(false)
            && self.subject_id == next.subject_id
            && self.teacher_id == next.teacher_id
            && self.resource_id == next.resource_id
    }
}

/// Records demand that could not be placed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnassignedMarker {
    pub subject_id: SubjectId,
    pub unassigned: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub double: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_of_double: Option<bool>,
}

impl UnassignedMarker {
    pub fn new(subject_id: &str) -> Self {
        Self {
            subject_id: subject_id.to_string(),
            unassigned: true,
            double: false,
            head_of_double: None,
        }
    }
}

/// The content of a non-empty grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TimetableEntry {
    Assigned(Assignment),
    Unassigned(UnassignedMarker),
}

impl TimetableEntry {
    pub fn subject_id(&self) -> &str {
        match self {
            TimetableEntry::Assigned(a) => &a.subject_id,
            TimetableEntry::Unassigned(m) => &m.subject_id,
        }
    }

    pub fn assignment(&self) -> Option<&Assignment> {
        match self {
            TimetableEntry::Assigned(a) => Some(a),
            TimetableEntry::Unassigned(_) => None,
        }
    }

    pub fn is_unassigned(&self) -> bool {
        matches!(self, TimetableEntry::Unassigned(_))
    }

    /// True for every cell except the second half of a double.
    pub fn is_head(&self) -> bool {
        match self {
            TimetableEntry::Assigned(a) => !a.is_tail(),
            TimetableEntry::Unassigned(m) => !(m.double && m.head_of_double == Some(false)),
        }
    }

    /// Copy of this entry as cell `offset` of a lesson spanning `span` periods.
    pub fn part(&self, span: usize, offset: usize) -> TimetableEntry {
        let double = span == 2;
        let head = double.then_some(offset == 0);
        match self {
            TimetableEntry::Assigned(a) => TimetableEntry::Assigned(Assignment {
                double,
                head_of_double: head,
                ..a.clone()
            }),
            TimetableEntry::Unassigned(m) => TimetableEntry::Unassigned(UnassignedMarker {
                double,
                head_of_double: head,
                ..m.clone()
            }),
        }
    }
}

impl fmt::Display for TimetableEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimetableEntry::Assigned(a) => match &a.resource_id {
                Some(resource) => write!(f, "{} ({} @ {})", a.subject_id, a.teacher_id, resource),
                None => write!(f, "{} ({})", a.subject_id, a.teacher_id),
            },
            TimetableEntry::Unassigned(m) => write!(f, "{} (unassigned)", m.subject_id),
        }
    }
}

/// One cell of a class grid; `None` is an untouched slot.
pub type Cell = Option<TimetableEntry>;

/// `grid[day][period]` for a single class.
pub type Grid = Vec<Vec<Cell>>;

/// Class id to grid. Ordered so that serialized output is stable.
pub type Timetable = BTreeMap<ClassId, Grid>;

/// Point contributions of each soft-constraint violation.
///
/// Callers that learn penalties from historical manual edits override these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PenaltyWeights {
    pub unassigned: u64,
    pub adjacency: u64,
    pub idle_gap: u64,
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        Self {
            unassigned: 20,
            adjacency: 10,
            idle_gap: 5,
        }
    }
}

/// Quality summary of a timetable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub unassigned_count: usize,
    pub penalty_score: u64,
    pub teacher_loads: BTreeMap<TeacherId, u32>,
}

/// Parameters of one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateOptions {
    pub seed: u32,
    pub optimize_iterations: usize,
    pub weights: PenaltyWeights,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            seed: crate::rng::DEFAULT_SEED,
            optimize_iterations: 200,
            weights: PenaltyWeights::default(),
        }
    }
}

/// Counters and timings of a generation run.
///
/// Kept apart from [`Diagnostics`] because the timings differ between
/// otherwise identical runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    pub requirements: usize,
    pub greedy_assigned: usize,
    pub greedy_unassigned: usize,
    pub dropped_requirements: usize,
    pub iterations: usize,
    pub same_slot_draws: usize,
    pub infeasible_swaps: usize,
    pub accepted_swaps: usize,
    pub initial_penalty: u64,
    pub final_penalty: u64,
    pub greedy_ms: u64,
    pub optimize_ms: u64,
}

/// The final output of the generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub timetable: Timetable,
    pub diagnostics: Diagnostics,
    pub stats: SearchStats,
}

/// Body of a generation request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub config: SchoolConfig,
    #[serde(flatten)]
    pub options: GenerateOptions,
}

/// Body of a penalty request for an existing timetable.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PenaltyRequest {
    pub config: SchoolConfig,
    pub timetable: Timetable,
    #[serde(default)]
    pub weights: PenaltyWeights,
}
