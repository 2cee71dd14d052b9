// Library for tests to access modules

pub mod app;
pub mod config;
pub mod influx_repo;
pub mod influxql;
pub mod latest_time;
pub mod lister;
pub mod models;
pub mod report;
pub mod tags;
pub mod version;
