//! Core business logic for yatube.
//!
//! Services sit between the web layer and the repositories: they validate
//! input, enforce ownership rules and assemble the view models that pages
//! render.

pub mod pagination;
pub mod services;

pub use pagination::{Page, Paginator};
pub use services::*;
