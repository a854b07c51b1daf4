//! 桥接层错误类型

use crate::compositor::ImageError;

use super::messages::ErrorPayload;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// 上一个请求尚未收到回复。
    #[error("已有请求正在处理中，请等待回复后再提交")]
    Busy,

    /// 特权侧已退出或回复通道被丢弃。
    #[error("处理后端已断开")]
    Disconnected,

    /// 特权侧返回了失败回复。
    #[error("处理失败（{}/{}）：{}", .0.stage, .0.code, .0.message)]
    Rejected(ErrorPayload),

    /// 收到与请求不匹配的回复。
    #[error("收到意外回复：{0}")]
    UnexpectedReply(&'static str),

    /// 请求方本地的编码/解码失败。
    #[error("{0}")]
    Image(#[from] ImageError),
}
