//! System prompt construction.

use crate::session::{ConversationContext, Domain};

/// Persona shared by every domain.
pub const BASE_PERSONA: &str = "You are Solaris, a helpful AI assistant designed to help with \
various domains. Be concise, helpful, and professional.";

/// Domain-specific instruction appended to [`BASE_PERSONA`].
pub fn domain_instruction(domain: Domain) -> &'static str {
    match domain {
        Domain::Aws => {
            "Focus on AWS development, best practices, and certification preparation. \
             Provide practical examples and explanations."
        }
        Domain::Finance => {
            "Help with financial organization, budgeting, and financial planning. \
             Be practical and educational."
        }
        Domain::Projects => {
            "Assist with project planning, organization, and tracking. \
             Help break down tasks and set milestones."
        }
        Domain::University => {
            "Support academic studies with clear explanations, study strategies, \
             and learning techniques."
        }
        Domain::General => "Provide general assistance and guidance across various topics.",
    }
}

/// Build the system prompt for a conversation: persona, blank line, domain
/// instruction. Only the domain is consulted.
pub fn build_system_prompt(context: &ConversationContext) -> String {
    format!("{BASE_PERSONA}\n\n{}", domain_instruction(context.domain))
}
