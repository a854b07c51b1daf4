//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载合成链路中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//! `code()` / `stage()` 提供稳定标识，供桥接层组装失败回复。

/// 图片合成统一错误类型。
///
/// 所有错误对单次请求都是终态：不重试，直接上报给请求方。
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("参数错误：{0}")]
    InvalidInput(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("编码错误：{0}")]
    Encode(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    /// 与输入无关的内部故障（锁中毒、工作线程异常退出）。
    #[error("内部错误：{0}")]
    Internal(String),
}

impl ImageError {
    /// 稳定错误码，前端可据此分支处理。
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidFormat(_) => "invalid_format",
            Self::Decode(_) => "decode_failed",
            Self::Encode(_) => "encode_failed",
            Self::ResourceLimit(_) => "resource_limit",
            Self::FileSystem(_) => "file_system",
            Self::Internal(_) => "internal",
        }
    }

    /// 出错所在阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) | Self::ResourceLimit(_) => "validate",
            Self::InvalidFormat(_) => "load",
            Self::Decode(_) => "decode",
            Self::Encode(_) => "encode",
            Self::FileSystem(_) => "save",
            Self::Internal(_) => "internal",
        }
    }
}
