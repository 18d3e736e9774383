//! Folio application library
//!
//! Wires the album catalogue module into the Folio kernel and HTTP server.

pub mod app;
pub mod modules;

pub use app::App;
