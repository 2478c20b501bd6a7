pub mod connection;
pub mod launcher;

pub use connection::connect_to_browser;
pub use launcher::{launch_browser, ChromeLauncher};
