// Event handling for chord-flows
// Key events, playback ticks and the headless report

pub mod headless;
pub mod loop_handler;

pub use headless::run_headless;
pub use loop_handler::run;
