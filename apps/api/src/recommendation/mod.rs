// Recommendation path: request-driven ranking of active postings for one student.
// All LLM calls go through llm_client; the ranker's output is reconciled before use.

pub mod assembler;
pub mod handlers;
pub mod prompts;
pub mod ranking;

pub use ranking::{GatewayRanker, RankingClient};
