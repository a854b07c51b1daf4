//! # 图片合成模块（compositor）
//!
//! ## 设计思路
//!
//! 该模块将“Data URL 解析 → 加载校验 → 解码 → 比例外接框计算 → 填充边框 → 贴图 → 编码”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `geometry`：纯几何计算（画布尺寸、原图偏移），不接触像素
//! - `handler`：`Compositor` 编排整条处理流水线
//! - `loader`：Data URL / 字节加载与签名校验
//! - `pipeline`：解码、资源限制、渲染与 PNG 编码
//! - `config/error/source`：配置、错误、数据模型
//!
//! ## 调用链
//!
//! ```text
//! bridge::Backend（特权侧）
//!    ↓
//! handler.rs（配置快照 + 阶段耗时日志）
//!    ├─ loader.rs（体积限制 + 文件签名）
//!    ├─ pipeline.rs（解码 + 像素限制）
//!    ├─ geometry.rs（plan_canvas）
//!    └─ pipeline.rs（render_canvas + 编码）
//!    ↓
//! ProcessingResult / ImageError
//! ```

mod config;
mod error;
mod geometry;
mod handler;
mod loader;
mod pipeline;
mod source;

pub use config::ProcessorConfig;
pub use error::ImageError;
pub use geometry::{CanvasPlan, plan_canvas};
pub use handler::Compositor;
pub use pipeline::render_canvas;
pub use source::{AspectRatio, Color, OutputEncoding, ProcessingRequest, ProcessingResult};

pub(crate) use source::RawImageData;
