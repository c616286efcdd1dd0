// Export our modules for use in binaries and tests
pub mod config;
pub mod loader;
pub mod logging;
pub mod playback;
pub mod search;

pub use config::AppConfig;
pub use loader::DatasetLoader;
pub use playback::{PlaybackTick, PlaybackTimer};
