use std::collections::HashMap;

use serde::Serialize;

use crate::assign::TopicId;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicGroup {
    pub topic: TopicId,
    /// Record identifiers in original record order.
    pub members: Vec<String>,
}

/// Record identifiers partitioned by topic. Groups keep the order in which
/// their topic was first encountered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicGroups {
    groups: Vec<TopicGroup>,
    index: HashMap<TopicId, usize>,
}

impl TopicGroups {
    pub fn get(&self, topic: TopicId) -> Option<&TopicGroup> {
        self.index.get(&topic).map(|&i| &self.groups[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &TopicGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of member identifiers across all groups.
    pub fn member_count(&self) -> usize {
        self.groups.iter().map(|g| g.members.len()).sum()
    }
}

/// Group record identifiers by their assigned topic.
pub fn aggregate(record_ids: &[String], topic_ids: &[TopicId]) -> Result<TopicGroups> {
    if record_ids.len() != topic_ids.len() {
        return Err(Error::ShapeMismatch {
            records: record_ids.len(),
            topics: topic_ids.len(),
        });
    }

    let mut groups = TopicGroups::default();
    for (id, &topic) in record_ids.iter().zip(topic_ids) {
        let slot = *groups.index.entry(topic).or_insert_with(|| {
            groups.groups.push(TopicGroup {
                topic,
                members: Vec::new(),
            });
            groups.groups.len() - 1
        });
        groups.groups[slot].members.push(id.clone());
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("rec{i}")).collect()
    }

    #[test]
    fn groups_in_encounter_order() {
        let groups = aggregate(&ids(6), &[0, 0, 1, 1, 0, -1]).unwrap();
        let order: Vec<TopicId> = groups.iter().map(|g| g.topic).collect();
        assert_eq!(order, vec![0, 1, -1]);
        assert_eq!(groups.get(0).unwrap().members, vec!["rec0", "rec1", "rec4"]);
        assert_eq!(groups.get(1).unwrap().members, vec!["rec2", "rec3"]);
        assert_eq!(groups.get(-1).unwrap().members, vec!["rec5"]);
        assert!(groups.get(7).is_none());
    }

    #[test]
    fn forms_a_partition() {
        let records = ids(50);
        let topics: Vec<TopicId> = (0..50).map(|i| (i * 7 % 5) as TopicId - 1).collect();
        let groups = aggregate(&records, &topics).unwrap();

        assert_eq!(groups.member_count(), records.len());
        let mut seen = HashSet::new();
        for group in groups.iter() {
            for member in &group.members {
                assert!(seen.insert(member.clone()), "{member} appears twice");
            }
        }
        assert_eq!(seen.len(), records.len());
    }

    #[test]
    fn length_mismatch_is_fatal() {
        let err = aggregate(&ids(3), &[0, 1]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { records: 3, topics: 2 }));
    }

    #[test]
    fn empty_input() {
        let groups = aggregate(&[], &[]).unwrap();
        assert!(groups.is_empty());
        assert_eq!(groups.member_count(), 0);
    }
}
