// Cross-cutting prompt fragments shared by every structured call.
// Each module that needs LLM calls defines its own prompts.rs alongside it.

/// Appended to every system prompt sent with a forced tool call.
pub const STRUCTURED_OUTPUT_INSTRUCTION: &str = "\
You MUST respond by calling the provided tool exactly once. \
Do NOT include any text outside the tool call. \
Every required field of the tool's input schema must be present with the declared type.";

/// Joins a module-specific system prompt with the structured-output instruction.
pub fn structured_system(system: &str) -> String {
    format!("{} {}", system.trim_end(), STRUCTURED_OUTPUT_INSTRUCTION)
}
