mod ids;
mod record;
mod stock;

pub use ids::RecordId;
pub use record::{Record, RecordInput};
pub use stock::{Stock, UNKNOWN_STOCK};
