use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::tokenizer::token_set;
use super::topics::Topic;
use crate::message::ChatMessage;

/// One group member: who said it and what.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    pub display_name: String,
    pub text: String,
}

/// Messages attributed to one topic. Members are in input order and each
/// contains the keyword as a whole token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicGroup {
    pub topic: Topic,
    pub first_mentioner: String,
    pub members: Vec<GroupMember>,
}

impl TopicGroup {
    /// Number of distinct display names among the members.
    pub fn participant_count(&self) -> usize {
        self.members
            .iter()
            .map(|m| m.display_name.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Member texts joined with a space.
    pub fn joined_text(&self) -> String {
        self.members
            .iter()
            .map(|m| m.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Assign every message to the first ranked topic it mentions.
///
/// Returned groups follow rank order; topics that attracted no message are
/// dropped. Messages matching no topic appear in no group.
pub fn group_by_topic(messages: &[ChatMessage], topics: &[Topic]) -> Vec<TopicGroup> {
    let mut slots: Vec<Option<TopicGroup>> = vec![None; topics.len()];
    let mut unmatched = 0usize;

    for msg in messages {
        let tokens = token_set(&msg.text);
        let Some(idx) = topics.iter().position(|t| tokens.contains(&t.keyword)) else {
            unmatched += 1;
            continue;
        };

        let member = GroupMember {
            display_name: msg.display_name.clone(),
            text: msg.text.clone(),
        };
        match &mut slots[idx] {
            Some(group) => group.members.push(member),
            slot @ None => {
                *slot = Some(TopicGroup {
                    topic: topics[idx].clone(),
                    first_mentioner: msg.display_name.clone(),
                    members: vec![member],
                });
            }
        }
    }

    let groups: Vec<TopicGroup> = slots.into_iter().flatten().collect();
    tracing::debug!(groups = groups.len(), unmatched, "Messages grouped by topic");
    groups
}
