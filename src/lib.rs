// Library for tests to access modules

pub mod chart;
pub mod config;
pub mod error;
pub mod format;
pub mod history;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod routes;
pub mod source;
pub mod stats;
pub mod version;
