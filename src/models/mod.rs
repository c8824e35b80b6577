//! Data models for aerofinder.

mod airline;
mod deal;
mod keyword;
mod monitor_url;
mod notice;

pub use airline::Airline;
pub use deal::{Deal, NewDeal};
pub use keyword::Keyword;
pub use monitor_url::{MonitorUrl, SelectorHints};
pub use notice::{ContentType, Notice, PLACEHOLDER_TITLE};
