//! Remote song catalog: track model, fetching and the one-shot loader.
//!
//! The catalog is fetched once per session from a Directus-style content API
//! (`{ "data": [...] }` envelope) and never mutated afterwards.

mod fetch;
mod model;

pub use fetch::*;
pub use model::*;
