// Library target holds the quiz engine and UI pieces; main.rs only wires the
// terminal, the event loop and the key bindings on top of it.

pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod quiz;
pub mod session;
pub mod store;
pub mod ui;
pub mod vocabulary;
