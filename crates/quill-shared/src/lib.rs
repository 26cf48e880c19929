//! # Quill Shared
//!
//! View models shared between the request handlers and the presentation
//! layer. Handlers assemble these; the renderer turns them into HTML.

pub mod view;

pub use view::{Nav, Page};
