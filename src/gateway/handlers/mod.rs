//! HTTP handlers for the campaign API
//! 活动API的HTTP处理器

pub mod campaigns;
pub mod health;

pub use campaigns::*;
pub use health::*;
