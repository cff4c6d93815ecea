/// Shareit - photo and video sharing backend
///
/// Authenticated media upload to a remote object store with a local-disk
/// fallback tier, plus likes, comments and paginated listing.
pub mod account;
pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod media;
pub mod server;
pub mod storage;
