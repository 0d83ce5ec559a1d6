//! `rtbl roster` - show the configured agents and whether they can speak.

use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use roundtable_core::credential::CredentialSource;
use roundtable_types::agent::{Agent, CredentialKey};

use crate::state::AppState;

/// One roster table row, before styling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    pub name: String,
    pub provider: String,
    pub model: String,
    /// `"{provider}:{voice}"`, or `-` when the agent is silent.
    pub voice: String,
    pub eligible: bool,
    /// Credentials the agent needs that are not configured.
    pub missing_keys: Vec<CredentialKey>,
}

/// Summarize each agent against the available credentials.
pub fn roster_rows(agents: &[Agent], credentials: &dyn CredentialSource) -> Vec<RosterRow> {
    agents
        .iter()
        .map(|agent| {
            let mut missing_keys = Vec::new();
            let chat_key = agent.provider.credential_key();
            if !credentials.has_credential(chat_key) {
                missing_keys.push(chat_key);
            }

            let voice = match agent.voice() {
                Some(voice) => {
                    let voice_key = agent.voice_provider.credential_key();
                    if voice_key != chat_key && !credentials.has_credential(voice_key) {
                        missing_keys.push(voice_key);
                    }
                    format!("{}:{voice}", agent.voice_provider)
                }
                None => "-".to_string(),
            };

            RosterRow {
                name: agent.name.clone(),
                provider: agent.provider.to_string(),
                model: agent.effective_model().to_string(),
                voice,
                eligible: agent.is_eligible(),
                missing_keys,
            }
        })
        .collect()
}

pub fn show_roster(state: &AppState) -> anyhow::Result<()> {
    let rows = roster_rows(&state.config.agents, state.credentials.as_ref());

    println!();
    if rows.is_empty() {
        println!("  {}", style("No agents configured.").yellow());
        println!(
            "  Add [[agents]] entries to {}",
            style(state.config_path.display()).cyan()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Provider").fg(Color::White),
        Cell::new("Model").fg(Color::White),
        Cell::new("Voice").fg(Color::White),
        Cell::new("Eligible").fg(Color::White),
        Cell::new("Keys").fg(Color::White),
    ]);

    for row in &rows {
        let eligible_cell = if row.eligible {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("no").fg(Color::Red)
        };
        let keys_cell = if row.missing_keys.is_empty() {
            Cell::new("ok").fg(Color::Green)
        } else {
            let missing = row
                .missing_keys
                .iter()
                .map(|k| k.env_var())
                .collect::<Vec<_>>()
                .join(", ");
            Cell::new(format!("missing {missing}")).fg(Color::Yellow)
        };

        table.add_row(vec![
            Cell::new(&row.name).fg(Color::Cyan),
            Cell::new(&row.provider).fg(Color::DarkGrey),
            Cell::new(&row.model).fg(Color::DarkGrey),
            Cell::new(&row.voice).fg(Color::DarkGrey),
            eligible_cell,
            keys_cell,
        ]);
    }

    println!("{table}");
    println!();

    let eligible = rows.iter().filter(|r| r.eligible).count();
    println!(
        "  {} of {} agent{} eligible",
        style(eligible).bold(),
        rows.len(),
        if rows.len() == 1 { "" } else { "s" }
    );
    println!(
        "  {}",
        style(format!("Config: {}", state.config_path.display())).dim()
    );
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_core::credential::StaticCredentials;
    use roundtable_types::agent::{GenerationProvider, VoiceProvider};

    #[test]
    fn test_rows_report_missing_keys() {
        let ada = Agent::new("Ada", "logician", GenerationProvider::Claude)
            .with_voice(VoiceProvider::ElevenLabs, "voice-1");
        let creds = StaticCredentials::new().with(CredentialKey::Anthropic, "sk-ant");

        let rows = roster_rows(&[ada], &creds);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].provider, "claude");
        assert_eq!(rows[0].model, "claude-sonnet-4-20250514");
        assert_eq!(rows[0].voice, "elevenlabs:voice-1");
        assert_eq!(rows[0].missing_keys, vec![CredentialKey::ElevenLabs]);
    }

    #[test]
    fn test_openai_voice_shares_chat_key() {
        let bo = Agent::new("Bo", "skeptic", GenerationProvider::OpenAi)
            .with_voice(VoiceProvider::OpenAiTts, "alloy");
        let rows = roster_rows(&[bo], &StaticCredentials::new());
        assert_eq!(rows[0].missing_keys, vec![CredentialKey::OpenAi]);
    }

    #[test]
    fn test_disabled_agent_is_not_eligible() {
        let mut cy = Agent::new("Cy", "poet", GenerationProvider::Gemini);
        cy.enabled = false;
        let creds = StaticCredentials::new().with(CredentialKey::Gemini, "g");

        let rows = roster_rows(&[cy], &creds);
        assert!(!rows[0].eligible);
        assert!(rows[0].missing_keys.is_empty());
        assert_eq!(rows[0].voice, "-");
    }
}
