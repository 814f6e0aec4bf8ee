mod access;
mod driver;

pub use access::DatabaseAccess;
pub use driver::DatabaseDriver;
