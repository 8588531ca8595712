//! Request-independent logic the handlers delegate to

pub mod billing;
pub mod content;
pub mod corrections;
pub mod filters;
pub mod hashing;
pub mod profile;
pub mod prompts;
pub mod quota;
pub mod tutor;
