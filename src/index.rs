use crate::data::{Resource, SchoolConfig, Subject, Teacher};
use itertools::Itertools;
use std::collections::HashMap;

/// Lookups over a [`SchoolConfig`], built once per generation run.
///
/// Ids that do not resolve are not an error here; they surface later as
/// requirements with no feasible teacher or resource.
#[derive(Debug, Clone)]
pub struct DomainIndex<'a> {
    pub subjects_by_id: HashMap<&'a str, &'a Subject>,
    pub teachers_by_id: HashMap<&'a str, &'a Teacher>,
    pub resources_by_id: HashMap<&'a str, &'a Resource>,
    /// Resources grouped by type tag, each group in configuration order.
    pub resources_by_type: HashMap<&'a str, Vec<&'a Resource>>,
    teachers_by_rank: Vec<&'a Teacher>,
}

impl<'a> DomainIndex<'a> {
    pub fn build(config: &'a SchoolConfig) -> Self {
        let subjects_by_id = config.subjects.iter().map(|s| (s.id.as_str(), s)).collect();
        let teachers_by_id = config.teachers.iter().map(|t| (t.id.as_str(), t)).collect();
        let resources_by_id = config.resources.iter().map(|r| (r.id.as_str(), r)).collect();
        let resources_by_type = config
            .resources
            .iter()
            .map(|r| (r.kind.as_str(), r))
            .into_group_map();
        let teachers_by_rank = config
            .teachers
            .iter()
            .sorted_by(|a, b| a.id.cmp(&b.id))
            .collect();

        Self {
            subjects_by_id,
            teachers_by_id,
            resources_by_id,
            resources_by_type,
            teachers_by_rank,
        }
    }

    pub fn subject(&self, id: &str) -> Option<&'a Subject> {
        self.subjects_by_id.get(id).copied()
    }

    pub fn teacher(&self, id: &str) -> Option<&'a Teacher> {
        self.teachers_by_id.get(id).copied()
    }

    pub fn resource(&self, id: &str) -> Option<&'a Resource> {
        self.resources_by_id.get(id).copied()
    }

    /// Teachers in ascending id order, the order candidates are tried in.
    pub fn teachers(&self) -> impl Iterator<Item = &'a Teacher> + '_ {
        self.teachers_by_rank.iter().copied()
    }

    /// Resources tagged `kind`, in configuration order.
    pub fn resources_of(&self, kind: &str) -> &[&'a Resource] {
        self.resources_by_type
            .get(kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
