mod params;
mod row;
mod sql_value;

pub use params::Parameters;
pub use row::RawQueryResult;
pub use sql_value::SqlValue;
