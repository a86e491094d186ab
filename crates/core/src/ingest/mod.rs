pub mod fixture;
pub mod provider;
pub mod types;
pub mod universe;

pub use provider::{
    fetch_keyed, fetch_many, fetch_record, source_from_settings, StockRecordSource,
};
