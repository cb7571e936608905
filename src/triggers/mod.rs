mod pubsub;

pub use pubsub::{pubsub_push, PushResponse};
