pub mod preferences;
pub mod status;
pub mod theme;
