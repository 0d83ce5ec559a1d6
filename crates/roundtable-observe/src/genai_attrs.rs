//! OpenTelemetry GenAI Semantic Convention attribute constants.
//!
//! All constants are string slices usable as `{ CONST } = value` field names
//! in `tracing::info_span!`.
//!
//! Span naming convention: `"{operation} {model}"` (e.g., `"chat gpt-4o-mini"`),
//! carried in the `otel.name` field.

// --- Required attributes ---

/// The name of the operation being performed (e.g., "chat", "speech").
pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";

/// The name of the GenAI provider (e.g., "anthropic").
pub const GEN_AI_PROVIDER_NAME: &str = "gen_ai.provider.name";

// --- Recommended attributes ---

/// The model ID requested.
pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";

/// The sampling temperature for the request.
pub const GEN_AI_REQUEST_TEMPERATURE: &str = "gen_ai.request.temperature";

/// The maximum number of output tokens requested.
pub const GEN_AI_REQUEST_MAX_TOKENS: &str = "gen_ai.request.max_tokens";

/// The number of input tokens consumed.
pub const GEN_AI_USAGE_INPUT_TOKENS: &str = "gen_ai.usage.input_tokens";

/// The number of output tokens generated.
pub const GEN_AI_USAGE_OUTPUT_TOKENS: &str = "gen_ai.usage.output_tokens";

/// The finish reasons for the response (e.g., "stop", "end_turn").
pub const GEN_AI_RESPONSE_FINISH_REASONS: &str = "gen_ai.response.finish_reasons";

// --- Agent-specific attributes ---

/// The display name of the speaking agent.
pub const GEN_AI_AGENT_NAME: &str = "gen_ai.agent.name";

// --- Operation name values ---

/// Chat completion.
pub const OP_CHAT: &str = "chat";

/// Text-to-speech synthesis.
pub const OP_SPEECH: &str = "speech";

// --- Provider name values ---

pub const PROVIDER_OPENAI: &str = "openai";
pub const PROVIDER_ANTHROPIC: &str = "anthropic";
pub const PROVIDER_GEMINI: &str = "gcp.gemini";
pub const PROVIDER_ELEVENLABS: &str = "elevenlabs";
