pub mod cache;
pub mod config;
pub mod diff;
pub mod dispatch;
pub mod error;
pub mod frontend;
pub mod gateway;
pub mod json_util;
pub mod normalize;
pub mod registries;
pub mod router;
pub mod upstream;
pub mod virtual_endpoints;
