pub mod contract;
pub mod portfolio;
pub mod recommendation;
pub mod stock;
pub mod user;
