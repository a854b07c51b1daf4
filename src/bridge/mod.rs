//! # 请求/回复桥接模块（bridge）
//!
//! ## 设计思路
//!
//! 界面线程不直接做图片合成，而是通过消息桥向特权侧请求处理，异步拿回结果。
//! 以 tokio 的 `mpsc` + `oneshot` 组成带类型的请求/回复通道，替代回调式 IPC：
//!
//! ```text
//! BridgeClient ──Envelope{process-image}──▶ Backend ──spawn_blocking──▶ Compositor
//!      ▲                                       │
//!      └──────oneshot{image-processed | image-process-failed}──┘
//! ```
//!
//! - `client`：请求方句柄，强制单请求在途
//! - `backend`：特权侧循环，每条请求恰好一次回复
//! - `messages`：线上消息与负载定义
//! - `save`：保存路径接缝与落盘

mod backend;
mod client;
mod error;
pub mod messages;
mod save;

pub use backend::Backend;
pub use client::BridgeClient;
pub use error::BridgeError;
pub use messages::{ErrorPayload, ReplyMessage, RequestMessage};
pub use save::{DirectoryPrompt, FixedPathPrompt, SavePrompt, SaveRequest};
