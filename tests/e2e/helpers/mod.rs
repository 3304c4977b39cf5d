//! 测试辅助工具

pub mod api_client;
pub mod assertions;

pub use api_client::TestApp;
