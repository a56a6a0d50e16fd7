pub mod common;
pub mod prices;
