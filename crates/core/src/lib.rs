//! # `stockscope-core` - 领域内核
//!
//! 定义整个工作区共享的实体、错误与端口 (Port)。
//! 本 crate 不依赖任何具体的存储或 Web 框架实现。

pub mod common;
pub mod config;
pub mod market;
pub mod query;
pub mod store;
