//! # 比例补边工具 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 界面侧 (表单 / 预览 / 另存为)               │
//! │                                                          │
//! │  EditorState ──patch──▶ ProcessingRequest                │
//! │        │                                                 │
//! │  BridgeClient  (单请求在途，Busy 拒绝重复提交)              │
//! └────────┼─────────────────────────────────────────────────┘
//!          ↕ process-image / image-processed / save-image ...
//! ┌────────┼─────────────────────────────────────────────────┐
//! │        ↕            特权侧 (Backend)                       │
//! │                                                          │
//! │  ┌─ compositor ── 比例外接框 + 纯色边框 + PNG 编码          │
//! │  ├─ bridge::save ─ SavePrompt 接缝 + 原样落盘              │
//! │  └─ settings ──── ProcessorConfig JSON 读写               │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`compositor`] | 几何计算、解码、渲染、编码，`ImageError` |
//! | [`bridge`] | 请求/回复消息、后端循环、请求方句柄、保存 |
//! | [`editor`] | 不可变表单状态与 `patch` 转换 |
//! | [`settings`] | 合成配置的加载与保存 |
//! | [`error`] | 应用级 `AppError` |

pub mod bridge;
pub mod compositor;
pub mod editor;
pub mod error;
pub mod settings;
