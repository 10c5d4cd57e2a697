pub mod generation;
pub mod message;
pub mod timestamp;
pub mod user;

pub use generation::{GeneratedCode, GenerationRequest};
pub use message::Message;
pub use user::{Subscription, SubscriptionRecord, User};
