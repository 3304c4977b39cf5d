//! 测试套件

pub mod admin_api;
pub mod concurrency;
pub mod validation;
