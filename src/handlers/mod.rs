// handlers/mod.rs - two security tiers
//
// Public (no auth) → Protected (bearer JWT, `AuthUser` in extensions)

pub mod protected;
pub mod public;
