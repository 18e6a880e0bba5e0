pub mod bench;
pub mod bind;
pub mod decode;
pub mod error;
pub mod generate;
pub mod record;
pub mod schema;
pub mod store;

#[cfg(test)]
pub(crate) mod test_utils;

pub use bench::{BenchReport, Harness, LatencySummary, OpKind, TimingSample};
pub use decode::Decoder;
pub use error::{print_error, BenchErr};
pub use record::{FieldValue, Record};
pub use schema::{Column, ColumnType, Schema};
pub use store::{SchemaStatus, StoreClient};

/// Rendering format for SQL `timestamp` fields, both in CSV and on output.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
