// Domain models: samples, series, interfaces, requests and statistics

mod interface;
mod request;
mod series;

pub use interface::{Direction, Interface, ItemRef};
pub use request::{ReportRequest, ReportStatistics, Statistic, parse_period};
pub use series::{NormalizedPoint, Sample, Series};
