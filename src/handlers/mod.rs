// handlers/mod.rs - two handler tiers
//
// Public (no session) → Protected (session required). The access gate runs
// in front of both and decides redirects before any handler is reached.

pub mod protected;
pub mod public;
