// Public handlers (no authentication required)
//
// Service description, health, shared summaries and the payment webhook,
// which authenticates with its own shared secret.

pub mod root;
pub mod summaries;
pub mod webhooks;

pub use root::{health, root};
pub use summaries::shared_summary_get;
pub use webhooks::payment_webhook;
