//! # 消息定义
//!
//! ## 设计思路
//!
//! 请求/回复都是带通道名的 JSON 消息：`{"channel": "...", "payload": ...}`。
//! 通道名与前端约定保持一致，新增的两个失败回复用于替代“无声无响应”。
//!
//! | 方向 | 通道 | 负载 |
//! |------|------|------|
//! | 请求 | `process-image` | `ProcessImagePayload` |
//! | 请求 | `save-image` | `SaveImagePayload` |
//! | 回复 | `image-processed` | PNG Data URL |
//! | 回复 | `image-process-failed` | `ErrorPayload` |
//! | 回复 | `image-saved` | 保存路径 |
//! | 回复 | `image-save-failed` | `ErrorPayload` |

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::compositor::{AspectRatio, Color, Compositor, ImageError, ProcessingRequest};

pub const PROCESS_IMAGE: &str = "process-image";
pub const SAVE_IMAGE: &str = "save-image";
pub const IMAGE_PROCESSED: &str = "image-processed";
pub const IMAGE_PROCESS_FAILED: &str = "image-process-failed";
pub const IMAGE_SAVED: &str = "image-saved";
pub const IMAGE_SAVE_FAILED: &str = "image-save-failed";

/// `process-image` 负载。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessImagePayload {
    /// 原图 Data URL。
    pub image: String,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    /// 前端传来的是 number，这里按 f64 接收后再校验为非负整数。
    #[serde(default)]
    pub border_thickness: f64,
    #[serde(default)]
    pub border_color: Color,
}

impl ProcessImagePayload {
    /// 由请求构造负载，原图编码为 Data URL。
    pub fn from_request(request: &ProcessingRequest) -> Self {
        Self {
            image: Compositor::encode_data_url(&request.image_bytes),
            aspect_ratio: request.aspect_ratio,
            border_thickness: request.border_thickness as f64,
            border_color: request.border_color,
        }
    }

    /// 在特权侧还原请求。负数、小数、非有限的边框厚度都会被拒绝。
    pub fn into_request(self, max_file_size: u64) -> Result<ProcessingRequest, ImageError> {
        let border_thickness = parse_thickness(self.border_thickness)?;
        let image_bytes = Compositor::parse_data_url_with_limit(&self.image, max_file_size)?;

        Ok(ProcessingRequest {
            image_bytes,
            aspect_ratio: self.aspect_ratio,
            border_thickness,
            border_color: self.border_color,
        })
    }
}

fn parse_thickness(value: f64) -> Result<u32, ImageError> {
    if !value.is_finite() {
        return Err(ImageError::InvalidInput(format!("边框厚度无效：{}", value)));
    }
    if value < 0.0 {
        return Err(ImageError::InvalidInput(format!("边框厚度不能为负数：{}", value)));
    }
    if value.fract() != 0.0 {
        return Err(ImageError::InvalidInput(format!("边框厚度必须是整数：{}", value)));
    }
    if value > u32::MAX as f64 {
        return Err(ImageError::ResourceLimit(format!("边框过厚：{}", value)));
    }
    Ok(value as u32)
}

/// `save-image` 负载：待写入的字节与建议文件名。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveImagePayload {
    pub array_buffer: Vec<u8>,
    pub suggested_file_name: String,
}

/// 失败回复负载。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: String,
    pub stage: String,
    pub message: String,
}

impl From<&ImageError> for ErrorPayload {
    fn from(error: &ImageError) -> Self {
        Self {
            code: error.code().to_string(),
            stage: error.stage().to_string(),
            message: error.to_string(),
        }
    }
}

/// 请求方 → 特权侧。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel", content = "payload")]
pub enum RequestMessage {
    #[serde(rename = "process-image")]
    ProcessImage(ProcessImagePayload),
    #[serde(rename = "save-image")]
    SaveImage(SaveImagePayload),
}

impl RequestMessage {
    pub fn channel(&self) -> &'static str {
        match self {
            Self::ProcessImage(_) => PROCESS_IMAGE,
            Self::SaveImage(_) => SAVE_IMAGE,
        }
    }
}

/// 特权侧 → 请求方。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel", content = "payload")]
pub enum ReplyMessage {
    #[serde(rename = "image-processed")]
    ImageProcessed(String),
    #[serde(rename = "image-process-failed")]
    ImageProcessFailed(ErrorPayload),
    #[serde(rename = "image-saved")]
    ImageSaved(String),
    #[serde(rename = "image-save-failed")]
    ImageSaveFailed(ErrorPayload),
}

impl ReplyMessage {
    pub fn channel(&self) -> &'static str {
        match self {
            Self::ImageProcessed(_) => IMAGE_PROCESSED,
            Self::ImageProcessFailed(_) => IMAGE_PROCESS_FAILED,
            Self::ImageSaved(_) => IMAGE_SAVED,
            Self::ImageSaveFailed(_) => IMAGE_SAVE_FAILED,
        }
    }
}

/// 通道内的一次投递：消息 + 一次性回复口。
///
/// 回复为 `None` 表示该请求按约定不产生回复消息（例如用户取消保存）。
pub(crate) struct Envelope {
    pub(crate) message: RequestMessage,
    pub(crate) reply: oneshot::Sender<Option<ReplyMessage>>,
}
