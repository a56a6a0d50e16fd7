pub mod api;
pub mod display;
pub mod returns;
pub mod schema;
pub mod selection;
pub mod stats;

pub use api::{build_client, HttpClient, PriceSource};
pub use display::ReturnTable;
pub use returns::{Frequency, PriceField, ReturnRow};
pub use schema::prices::{PriceCell, Prices, Yahoo};
pub use selection::Selection;
pub use stats::ReturnStats;
