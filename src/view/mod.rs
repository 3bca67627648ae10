//! Record management view
//!
//! The student-facing surface: a screen state machine (list + modal form +
//! delete confirmation) over the store, a plain-text table renderer for the
//! terminal, and a tera-rendered HTML/JSON dashboard export.
//!
//! The screen deliberately contains no terminal I/O; the CLI drives it and
//! prints what it renders, which keeps every behavior unit-testable.

pub mod export;
pub mod form;
pub mod render;
pub mod screen;
pub mod templates;

pub use export::export_dashboard;
pub use form::{StudentForm, YEAR_LEVELS};
pub use screen::RosterScreen;
pub use templates::TemplateEngine;
