pub mod hash;
pub mod health;
pub mod token;
