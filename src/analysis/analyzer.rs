//! Rule-based conversation statistics.
//!
//! Topics and recommendations come from fixed tables; there is no learned
//! scoring. Sentiment is a constant placeholder.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::session::{ConversationContext, Domain, Message, Role};

/// Placeholder sentiment label reported for every conversation.
pub const PLACEHOLDER_SENTIMENT: &str = "positive";

/// Keyword table: a topic is reported when any keyword occurs as a
/// case-insensitive substring of any message.
const TOPIC_KEYWORDS: &[(&str, &[&str])] = &[
    ("AWS", &["aws"]),
    ("AWS Services", &["ec2", "lambda", "s3"]),
    ("Learning", &["study", "learn"]),
    ("Project Management", &["project"]),
];

/// Statistics for one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub message_count: usize,
    pub user_messages: usize,
    pub assistant_messages: usize,
    pub system_messages: usize,
    pub domain: Domain,
    /// Sum of message content lengths, in characters.
    pub conversation_length: usize,
    /// Sorted, de-duplicated topic labels.
    pub topics: Vec<String>,
    pub sentiment: String,
    pub recommendations: Vec<String>,
}

/// Analyze a transcript.
pub fn analyze(messages: &[Message], context: &ConversationContext) -> AnalysisResult {
    let count_role = |role: Role| messages.iter().filter(|m| m.role == role).count();
    AnalysisResult {
        message_count: messages.len(),
        user_messages: count_role(Role::User),
        assistant_messages: count_role(Role::Assistant),
        system_messages: count_role(Role::System),
        domain: context.domain,
        conversation_length: messages.iter().map(|m| m.content.chars().count()).sum(),
        topics: extract_topics(messages),
        sentiment: PLACEHOLDER_SENTIMENT.to_string(),
        recommendations: recommendations_for(context.domain)
            .iter()
            .map(|s| s.to_string())
            .collect(),
    }
}

/// Topic labels matched by [`TOPIC_KEYWORDS`].
pub fn extract_topics(messages: &[Message]) -> Vec<String> {
    let mut topics = BTreeSet::new();
    for message in messages {
        let content = message.content.to_lowercase();
        for (topic, keywords) in TOPIC_KEYWORDS {
            if keywords.iter().any(|k| content.contains(k)) {
                topics.insert(*topic);
            }
        }
    }
    topics.into_iter().map(String::from).collect()
}

/// Canned recommendations per domain.
pub fn recommendations_for(domain: Domain) -> &'static [&'static str] {
    match domain {
        Domain::Aws => &[
            "Consider hands-on labs with AWS Free Tier",
            "Review AWS Well-Architected Framework",
            "Practice with sample exam questions",
        ],
        Domain::Finance => &[
            "Track your expenses regularly",
            "Set up automatic savings",
            "Review your budget monthly",
        ],
        Domain::Projects => &[
            "Break down large tasks into smaller ones",
            "Set realistic deadlines",
            "Track progress regularly",
        ],
        Domain::University | Domain::General => &[],
    }
}
