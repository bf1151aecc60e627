//! Data access for subscribers and daily digests.
//!
//! Both traits are implemented directly on [`sqlx::SqlitePool`], so the HTTP
//! state and the pipeline just hold a pool.

mod digests;
mod subscribers;

pub use digests::DigestStore;
pub use subscribers::SubscriberRegistry;
