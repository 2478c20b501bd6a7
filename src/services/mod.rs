pub mod login_gate;
pub mod search_render;

pub use login_gate::{LoginGate, LoginState};
pub use search_render::render;
