//! adscript - streaming ad-script viewer
//!
//! Renders a small markdown dialect (headings, emphasis, pipe tables) to
//! markup, reveals a finished script a few characters at a time to imitate
//! live generation, and exports the result as plain text, markdown or a
//! word-processor document.
//!
//! Components:
//! - `render`: pure markdown-subset renderer, safe on any prefix
//! - `reveal`: timed reveal loop and status-phrase rotation
//! - `session`: request lifecycle state machine owning the timers
//! - `generation`: backend client plus file, stdin and demo sources
//! - `export`: clipboard and download adapters
//! - `config`, `logging`: ambient setup shared by the binary

pub mod config;
pub mod document;
pub mod export;
pub mod generation;
pub mod logging;
pub mod render;
pub mod reveal;
pub mod session;
pub mod util;

pub use document::Document;
pub use render::render;
