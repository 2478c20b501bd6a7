pub mod logging;

pub use logging::{init as init_logging, log_outcome, log_startup, truncate_text, LogTarget};
