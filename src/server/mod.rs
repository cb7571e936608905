mod app;
mod middleware;
mod state;

pub use app::create_app;
pub use middleware::{extract_push_token, push_token_auth, PushTokenQuery, PUSH_TOKEN_HEADER};
pub use state::AppState;
