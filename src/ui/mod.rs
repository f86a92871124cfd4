pub mod drop_zone;
pub mod panels;
pub mod plot;
