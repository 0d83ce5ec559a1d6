//! Infrastructure layer for Roundtable.
//!
//! Implements the ports defined in `roundtable-core`: HTTP generation
//! clients (OpenAI, Anthropic Claude, Google Gemini), HTTP speech clients
//! (OpenAI TTS, ElevenLabs), credential sources, an external-player playback
//! sink, and the TOML config loader.

pub mod config;
pub mod http;
pub mod llm;
pub mod playback;
pub mod secret;
pub mod tts;
