// Notification path: periodic sweep matching new postings against opted-in students.
// Matching is keyword-based and synchronous; delivery goes through DeliveryService.

pub mod delivery;
pub mod digest;
pub mod handlers;
pub mod matcher;
pub mod sweep;

pub use delivery::{DeliveryService, ResendDelivery};
