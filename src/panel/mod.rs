//! The preferences form: state machine, validation rules and view model.

pub mod controller;
pub mod validation;
pub mod view;

pub use controller::{PanelTimings, PreferencesPanel};
pub use validation::{validate, ValidationError};
pub use view::{Feedback, PanelView};
