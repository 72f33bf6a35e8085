pub mod alerts;
pub mod rates;
pub mod setup;
pub mod sweep;
pub mod ui;
