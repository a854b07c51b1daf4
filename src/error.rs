//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义应用级 `AppError`，汇总合成、桥接、设置与 I/O 错误，
//! 供命令行入口与设置加载统一返回，避免分散的 `.map_err(|e| e.to_string())`。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `ImageError` / `BridgeError` / `io::Error` 提供 `From` 转换，无需手动 map。

use crate::bridge::BridgeError;
use crate::compositor::ImageError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 图片合成错误（解码 / 参数 / 资源限制）
    #[error("{0}")]
    Image(#[from] ImageError),

    /// 请求/回复桥接错误
    #[error("{0}")]
    Bridge(#[from] BridgeError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 设置文件不可用
    #[error("设置错误: {0}")]
    Settings(String),
}
