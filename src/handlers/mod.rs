// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer session required, writes need admin)
pub mod protected;
pub mod public;
