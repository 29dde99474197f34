pub mod cleaner;
pub mod grouping;
pub mod mentions;
pub mod textrank;
pub mod tokenizer;
pub mod topics;

pub use grouping::{group_by_topic, GroupMember, TopicGroup};
pub use topics::{rank_topics, Topic};
