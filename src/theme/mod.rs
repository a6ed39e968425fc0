pub mod holder;

pub use holder::{SharedThemeHolder, ThemeHolder};
