pub mod cli;
pub mod cli_error;
pub mod dashboard;
pub mod formatting;
pub mod gateway;
pub mod lookup;
pub mod record_ref;
mod setup;
pub mod stats;
pub mod validation;

pub fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
