// omada-api: Async Rust client for the TP-Link Omada controller API

pub mod auth;
pub mod client;
pub mod clients;
pub mod devices;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod logs;
pub mod models;
pub mod pager;
pub mod transport;

pub use auth::{HEADER_CSRF_TOKEN, Session};
pub use client::{DEFAULT_SITE, OmadaClient};
pub use envelope::{decode, decode_as, decode_body};
pub use error::Error;
pub use filter::{LEVEL_VALUES, Level, LogFilter, MODULE_VALUES, Module};
pub use models::{Client, CurrentUser, Device, LogEntry, SwitchPort};
pub use pager::{
    BlockingPager, DEFAULT_PAGE_SIZE, Page, PageCursor, PageFetcher, PageQuery, Pager,
};
pub use transport::{TlsMode, TransportConfig};
