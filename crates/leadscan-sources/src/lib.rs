//! Content sources for leadscan.
//!
//! Platform crawling lives in an external collector service; this crate
//! defines the raw item shapes it delivers, the [`ContentSource`] capability
//! the scan orchestrator consumes, and the HTTP client that talks to the
//! collector.

pub mod collector;
pub mod error;
pub mod item;
pub mod source;

pub use collector::{CollectorSource, CollectorSourceConfig};
pub use error::SourceError;
pub use item::{FacebookPost, InstagramComment, InstagramPost, PlatformItem, RawTimestamp, YoutubeComment};
pub use source::ContentSource;
