//! The talk loop: wires the orchestrator to its adapters and runs the
//! transcript / input multiplexer until the user quits.

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use console::style;
use rustyline_async::SharedWriter;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use roundtable_core::conversation::{Collaborators, ConversationOrchestrator};
use roundtable_core::credential::CredentialSource;
use roundtable_core::llm::box_client::BoxGenerationClient;
use roundtable_core::notify::TracingNotifier;
use roundtable_core::roster::{AgentRoster, SharedRoster};
use roundtable_core::speech::client::BoxSpeechClient;
use roundtable_core::speech::playback::{BoxPlaybackSink, SilentPlayback};
use roundtable_infra::llm::RoutingGenerationClient;
use roundtable_infra::playback::{CommandPlaybackSink, PlayerCommand};
use roundtable_infra::tts::RoutingSpeechClient;
use roundtable_types::config::ConversationConfig;
use roundtable_types::conversation::{ConversationStatus, LengthLevel};

use super::TalkArgs;
use super::commands::{self, TalkCommand};
use super::input::{InputEvent, TalkInput};
use super::renderer::TranscriptRenderer;
use crate::state::AppState;

/// Whether the loop keeps going after a command.
enum Flow {
    Continue,
    Quit,
}

/// Start a conversation and stay interactive until `/quit` or Ctrl+D.
pub async fn run_talk(state: &AppState, args: TalkArgs) -> anyhow::Result<()> {
    let mut config = session_config(state.config.conversation.clone(), &args);
    let (playback, player) = build_playback(&args)?;
    let audio_available = player.is_some();
    if !audio_available {
        config.voice_muted = true;
    }

    let credentials: Arc<dyn CredentialSource> = state.credentials.clone();
    let roster: Arc<dyn AgentRoster> = Arc::new(SharedRoster::new(state.config.agents.clone()));
    let collaborators = Collaborators {
        generation: BoxGenerationClient::new(RoutingGenerationClient::new(Arc::clone(&credentials))?),
        speech: BoxSpeechClient::new(RoutingSpeechClient::new(Arc::clone(&credentials))?),
        playback,
        roster: Arc::clone(&roster),
        credentials,
        notifier: Arc::new(TracingNotifier),
    };

    let orchestrator = ConversationOrchestrator::new(collaborators, config);
    let mut events = orchestrator.subscribe();

    let topic = args.topic.join(" ");
    orchestrator.start(&topic)?;

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut input, mut writer) =
        TalkInput::new(prompt).map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    print_banner(&mut writer, &topic, &roster, &orchestrator, player.as_ref())?;

    let mut renderer = TranscriptRenderer::new();
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    if let Some(line) = renderer.render(&event) {
                        writeln!(writer, "{line}")?;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "transcript fell behind; some events were dropped");
                }
                Err(RecvError::Closed) => break,
            },
            input_event = input.read_line() => match input_event {
                InputEvent::Eof => {
                    orchestrator.stop();
                    break;
                }
                InputEvent::Interrupted => {
                    if orchestrator.pause() {
                        writeln!(writer, "  {}", style("Paused. /resume to continue, Ctrl+D to exit.").dim())?;
                    }
                }
                InputEvent::Line(text) => {
                    if text.is_empty() {
                        continue;
                    }
                    if let Some(cmd) = commands::parse(&text) {
                        match handle_command(cmd, &orchestrator, &mut writer, audio_available)? {
                            Flow::Continue => continue,
                            Flow::Quit => {
                                orchestrator.stop();
                                break;
                            }
                        }
                    }
                    if let Err(e) = orchestrator.intervene(&text) {
                        writeln!(writer, "  {} {e}", style("!").yellow().bold())?;
                    }
                }
            },
        }
    }

    writeln!(writer, "\n  {}", style("Session ended.").dim())?;
    input.finish();
    debug!(messages = orchestrator.messages().len(), "talk loop finished");
    Ok(())
}

/// Apply command-line overrides on top of the file's conversation table.
fn session_config(mut config: ConversationConfig, args: &TalkArgs) -> ConversationConfig {
    if args.mute {
        config.voice_muted = true;
    }
    if let Some(mode) = args.turn_mode {
        config.turn_mode = mode.into();
    }
    if let Some(level) = args.length {
        config.length_level = LengthLevel::new(level);
    }
    config
}

/// Pick the audio output: an explicit `--player`, else the first known
/// player on `PATH`, else silence.
fn build_playback(args: &TalkArgs) -> anyhow::Result<(BoxPlaybackSink, Option<PlayerCommand>)> {
    let player = match args.player.as_deref() {
        Some(command_line) => Some(PlayerCommand::parse(command_line).context("--player is empty")?),
        None => PlayerCommand::detect(),
    };

    let Some(player) = player else {
        warn!("no audio player found on PATH; speech will not be played");
        return Ok((BoxPlaybackSink::new(SilentPlayback), None));
    };

    let spool_dir = args
        .audio_dir
        .clone()
        .unwrap_or_else(CommandPlaybackSink::default_spool_dir);
    let sink = CommandPlaybackSink::new(player.clone(), &spool_dir)
        .with_context(|| format!("failed to create audio directory {}", spool_dir.display()))?;
    Ok((BoxPlaybackSink::new(sink), Some(player)))
}

fn handle_command(
    cmd: TalkCommand,
    orchestrator: &ConversationOrchestrator,
    writer: &mut SharedWriter,
    audio_available: bool,
) -> std::io::Result<Flow> {
    match cmd {
        TalkCommand::Help => write!(writer, "{}", commands::help_text())?,
        TalkCommand::Pause => {
            if !orchestrator.pause() {
                writeln!(writer, "  {}", style("Nothing to pause.").dim())?;
            }
        }
        TalkCommand::Resume => {
            if !orchestrator.resume() {
                writeln!(writer, "  {}", style("Nothing to resume.").dim())?;
            }
        }
        TalkCommand::Stop => {
            if !orchestrator.stop() {
                writeln!(writer, "  {}", style("Already stopped.").dim())?;
            }
        }
        TalkCommand::Mute => {
            orchestrator.set_voice_muted(true);
            writeln!(writer, "  {}", style("Speech muted.").dim())?;
        }
        TalkCommand::Unmute => {
            if audio_available {
                orchestrator.set_voice_muted(false);
                writeln!(writer, "  {}", style("Speech unmuted.").dim())?;
            } else {
                writeln!(
                    writer,
                    "  {} No audio player found; pass --player to hear speech.",
                    style("!").yellow().bold()
                )?;
            }
        }
        TalkCommand::Status => write!(writer, "{}", status_text(orchestrator))?,
        TalkCommand::Quit => return Ok(Flow::Quit),
        TalkCommand::Unknown(name) => writeln!(
            writer,
            "  {} Unknown command: {}. Type /help for available commands.",
            style("?").yellow().bold(),
            style(name).dim()
        )?,
    }
    Ok(Flow::Continue)
}

fn status_text(orchestrator: &ConversationOrchestrator) -> String {
    let status = orchestrator.status();
    let status_style = match status {
        ConversationStatus::Running => style(status.to_string()).green(),
        ConversationStatus::Paused => style(status.to_string()).yellow(),
        ConversationStatus::Idle => style(status.to_string()).dim(),
    };
    let messages = orchestrator.messages();
    let speaking = orchestrator
        .speaking_agent()
        .and_then(|id| {
            messages
                .iter()
                .rev()
                .find(|m| m.is_from(&id))
                .map(|m| m.speaker_name.clone())
        })
        .unwrap_or_else(|| "-".to_string());
    let config = orchestrator.config();

    format!(
        "\n  {:<11} {}\n  {:<11} {}\n  {:<11} {}\n  {:<11} {}\n  {:<11} {}\n  {:<11} {}\n\n",
        "Status:",
        status_style,
        "Topic:",
        orchestrator.topic(),
        "Messages:",
        messages.len(),
        "Speaking:",
        speaking,
        "Thinking:",
        if orchestrator.is_generating() { "yes" } else { "no" },
        "Speech:",
        if config.voice_muted { "muted" } else { "on" },
    )
}

fn print_banner(
    writer: &mut SharedWriter,
    topic: &str,
    roster: &Arc<dyn AgentRoster>,
    orchestrator: &ConversationOrchestrator,
    player: Option<&PlayerCommand>,
) -> std::io::Result<()> {
    let names = roster
        .eligible()
        .iter()
        .map(|a| a.name.clone())
        .collect::<Vec<_>>()
        .join(", ");
    let config = orchestrator.config();
    let audio = match (config.voice_muted, player) {
        (true, _) => "muted".to_string(),
        (false, Some(player)) => format!("via {}", player.program),
        (false, None) => "no player".to_string(),
    };

    writeln!(writer)?;
    writeln!(writer, "  {} {}", style("Roundtable:").cyan().bold(), style(topic).bold())?;
    writeln!(writer, "  {}  {}", style("Agents:").bold(), style(names).dim())?;
    writeln!(
        writer,
        "  {}  {} ({}, length {})",
        style("Turns:").bold(),
        style(config.turn_mode).dim(),
        style(format!("speech {audio}")).dim(),
        config.length_level.get()
    )?;
    writeln!(writer)?;
    writeln!(
        writer,
        "  {}",
        style("Type to interject, /help for commands, Ctrl+D to exit").dim()
    )?;
    writeln!(writer, "  {}", style("---").dim())?;
    Ok(())
}
