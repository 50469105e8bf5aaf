pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod files;
pub mod humanize;
pub mod lifecycle;
pub mod logging;
pub mod queue;
pub mod services;
pub mod status;
pub mod store;
pub mod types;
pub mod url_policy;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;
