//! Context window assembly for one agent's turn.
//!
//! Layout of the system instructions:
//! ```text
//! You are {name}. {description}
//!
//! You are in a group conversation about: "{topic}"
//! Other participants: {names}
//!
//! Rules:
//! - Stay in character
//! - {length instruction}
//! - ...
//!
//! {emotional directive, if any}
//! ```
//!
//! History is the tail of the log seen from the speaking agent: its own
//! turns are `assistant`, everything else is a tagged `user` turn.

use roundtable_types::agent::Agent;
use roundtable_types::conversation::LengthLevel;
use roundtable_types::llm::{ChatMessage, GenerationRequest};
use roundtable_types::message::{Message, Role, Speaker};

/// Sentence describing the expected reply size at `level`.
pub fn length_instruction(level: LengthLevel) -> &'static str {
    match level.get() {
        1 => "Keep responses EXTREMELY brief - just 2-5 words maximum, like quick reactions",
        2 => "Keep responses very short - one brief sentence (5-10 words)",
        3 => "Keep responses short - 1 sentence maximum (10-15 words)",
        4 => "Keep responses concise - 1-2 short sentences",
        5 => "Keep responses moderate - 2-3 sentences",
        6 => "You may provide moderate detail (1-2 paragraphs)",
        7 => "You may provide good detail (2-3 paragraphs)",
        8 => "You may provide extensive detail (3-4 paragraphs)",
        9 => "Provide detailed, comprehensive responses",
        _ => "Provide very detailed, thorough responses",
    }
}

/// Builds generation requests from the log.
pub struct ContextBuilder;

impl ContextBuilder {
    /// System instructions for `agent`.
    ///
    /// `roster` is every configured agent; `agent` itself and unnamed
    /// entries are left out of the participant list.
    pub fn system_prompt(
        agent: &Agent,
        topic: &str,
        roster: &[Agent],
        length_level: LengthLevel,
        directive: Option<&str>,
    ) -> String {
        let others = roster
            .iter()
            .filter(|a| a.id != agent.id && !a.name.trim().is_empty())
            .map(|a| a.name.trim())
            .collect::<Vec<_>>()
            .join(", ");

        let mut prompt = format!(
            "You are {name}. {description}\n\n\
             You are in a group conversation about: \"{topic}\"\n\
             Other participants: {others}\n\n\
             Rules:\n\
             - Stay in character\n\
             - {length}\n\
             - React to what others have said\n\
             - Be natural and conversational\n\
             - Do not use action markers like *actions* unless it fits your character",
            name = agent.name.trim(),
            description = agent.description.trim(),
            length = length_instruction(length_level),
        );

        if let Some(directive) = directive.map(str::trim).filter(|d| !d.is_empty()) {
            prompt.push_str("\n\n");
            prompt.push_str(directive);
        }

        prompt
    }

    /// The last `context_size` messages remapped to `agent`'s point of view.
    ///
    /// Only the first system message (the topic announcement) is kept.
    pub fn history(agent: &Agent, log: &[Message], context_size: usize) -> Vec<ChatMessage> {
        let kept: Vec<&Message> = log
            .iter()
            .enumerate()
            .filter(|(i, m)| m.role != Role::System || *i == 0)
            .map(|(_, m)| m)
            .collect();
        let start = kept.len().saturating_sub(context_size);

        kept[start..]
            .iter()
            .map(|m| match m.speaker {
                Speaker::System => ChatMessage::user(format!("[Topic announced] {}", m.content)),
                Speaker::Agent(id) if id == agent.id => ChatMessage::assistant(m.content.clone()),
                Speaker::Human => ChatMessage::user(format!("[Moderator]: {}", m.content)),
                Speaker::Agent(_) => {
                    ChatMessage::user(format!("[{}]: {}", m.speaker_name, m.content))
                }
            })
            .collect()
    }

    /// Full request for `agent`'s next utterance.
    pub fn build(
        agent: &Agent,
        topic: &str,
        roster: &[Agent],
        log: &[Message],
        context_size: usize,
        length_level: LengthLevel,
        directive: Option<&str>,
    ) -> GenerationRequest {
        GenerationRequest {
            provider: agent.provider,
            model: agent.effective_model().to_string(),
            system: Self::system_prompt(agent, topic, roster, length_level, directive),
            messages: Self::history(agent, log, context_size),
            length_level,
            temperature: agent.temperature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_types::agent::GenerationProvider;
    use roundtable_types::llm::ChatRole;

    fn ada() -> Agent {
        Agent::new("Ada", "A careful logician.", GenerationProvider::OpenAi)
    }

    fn bo() -> Agent {
        Agent::new("Bo", "A skeptic.", GenerationProvider::Claude)
    }

    #[test]
    fn test_length_instruction_table_ends() {
        assert!(length_instruction(LengthLevel::new(1)).contains("2-5 words"));
        assert!(length_instruction(LengthLevel::new(5)).contains("2-3 sentences"));
        assert_eq!(
            length_instruction(LengthLevel::new(10)),
            "Provide very detailed, thorough responses"
        );
    }

    #[test]
    fn test_system_prompt_names_persona_topic_and_others() {
        let (ada, bo) = (ada(), bo());
        let roster = vec![ada.clone(), bo.clone()];
        let prompt =
            ContextBuilder::system_prompt(&ada, "chess", &roster, LengthLevel::new(5), None);

        assert!(prompt.starts_with("You are Ada. A careful logician."));
        assert!(prompt.contains("conversation about: \"chess\""));
        assert!(prompt.contains("Other participants: Bo\n"));
        assert!(prompt.contains("- Keep responses moderate - 2-3 sentences"));
        assert!(!prompt.contains("agrees with you"));
    }

    #[test]
    fn test_directive_is_appended() {
        let ada = ada();
        let prompt = ContextBuilder::system_prompt(
            &ada,
            "chess",
            &[ada.clone()],
            LengthLevel::new(2),
            Some("Bo agrees with you."),
        );
        assert!(prompt.ends_with("\n\nBo agrees with you."));
    }

    #[test]
    fn test_history_remaps_speakers() {
        let (ada, bo) = (ada(), bo());
        let log = vec![
            Message::topic("chess"),
            Message::from_agent(&ada, "x1"),
            Message::from_agent(&bo, "x2"),
            Message::interjection("hello"),
        ];
        let history = ContextBuilder::history(&ada, &log, 20);

        assert_eq!(history.len(), 4);
        assert_eq!(history[0], ChatMessage::user("[Topic announced] Topic: chess"));
        assert_eq!(history[1], ChatMessage::assistant("x1"));
        assert_eq!(history[2], ChatMessage::user("[Bo]: x2"));
        assert_eq!(history[3], ChatMessage::user("[Moderator]: hello"));
    }

    #[test]
    fn test_history_keeps_tail_and_drops_later_system_messages() {
        let (ada, bo) = (ada(), bo());
        let mut log = vec![Message::topic("chess")];
        for i in 0..5 {
            log.push(Message::from_agent(&bo, format!("b{i}")));
        }
        log.push(Message::topic("ignored"));

        let history = ContextBuilder::history(&ada, &log, 3);
        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["[Bo]: b2", "[Bo]: b3", "[Bo]: b4"]);
        assert!(history.iter().all(|m| m.role == ChatRole::User));
    }

    #[test]
    fn test_build_uses_agent_settings() {
        let bo = bo();
        let log = vec![Message::topic("chess")];
        let request =
            ContextBuilder::build(&bo, "chess", &[bo.clone()], &log, 20, LengthLevel::new(1), None);
        assert_eq!(request.provider, GenerationProvider::Claude);
        assert_eq!(request.model, "claude-sonnet-4-20250514");
        assert_eq!(request.max_tokens(), 50);
        assert_eq!(request.messages.len(), 1);
    }
}
