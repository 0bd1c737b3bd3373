// Library for tests to access modules

pub mod config;
pub mod latency;
pub mod models;
pub mod poller;
pub mod severity;
pub mod topology;
pub mod version;
