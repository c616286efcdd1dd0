// Terminal module for chord-flows
// Raw mode and alternate screen lifecycle

pub mod setup;

pub use setup::{cleanup_terminal_state, setup_terminal};
