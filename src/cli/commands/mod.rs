mod admin;
mod ask;
mod chat;
mod serve;

pub use admin::{cmd_grant, cmd_revoke, cmd_users};
pub use ask::cmd_ask;
pub use chat::cmd_chat;
pub use serve::cmd_serve;
