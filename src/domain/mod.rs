// Domain layer - Pure types and algorithms, no I/O
pub mod bucket;
pub mod color;
pub mod entity;
pub mod error;
pub mod i18n;
pub mod state;
pub mod waterfall;
