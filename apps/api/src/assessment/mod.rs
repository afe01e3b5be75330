// Assessment: heuristic scorer, schema contract, and the reasoning-service client that
// falls back to the heuristic whenever the service cannot be used.

pub mod client;
pub mod heuristic;
pub mod prompts;
pub mod schema;
