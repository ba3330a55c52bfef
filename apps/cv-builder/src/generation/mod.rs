// AI drafting: prompt building, the per-field busy tracker and the drafting client.
// All model calls go through llm_client.

pub mod drafting;
pub mod handlers;
pub mod prompts;
pub mod tracker;
