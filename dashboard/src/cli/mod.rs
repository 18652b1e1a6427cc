pub mod manage_records;
mod tables;
pub mod util;
