//! 结果保存模块
//!
//! # 设计思路
//!
//! 保存路径由外部“另存为”对话框决定，这里用 `SavePrompt` trait 表示该接缝：
//! 返回 `None` 即用户取消，不写文件、不发回复。
//!
//! # 实现思路
//!
//! - 字节原样写入选定路径，不做二次编码。
//! - 写入失败返回 `ImageError::FileSystem`，由后端记录日志并回复 `image-save-failed`。

use std::fs;
use std::path::{Path, PathBuf};

use crate::compositor::{ImageError, ProcessingResult};

use super::messages::SaveImagePayload;

/// “另存为”对话框接缝。
pub trait SavePrompt: Send + Sync {
    /// 根据建议文件名询问保存路径；返回 `None` 表示用户取消。
    fn choose_save_path(&self, suggested_file_name: &str) -> Option<PathBuf>;
}

/// 固定路径：命令行场景下输出路径在启动时已确定。
#[derive(Debug, Clone)]
pub struct FixedPathPrompt {
    path: PathBuf,
}

impl FixedPathPrompt {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SavePrompt for FixedPathPrompt {
    fn choose_save_path(&self, _suggested_file_name: &str) -> Option<PathBuf> {
        Some(self.path.clone())
    }
}

/// 目录模式：保存到指定目录，文件名使用建议文件名。
#[derive(Debug, Clone)]
pub struct DirectoryPrompt {
    dir: PathBuf,
}

impl DirectoryPrompt {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SavePrompt for DirectoryPrompt {
    fn choose_save_path(&self, suggested_file_name: &str) -> Option<PathBuf> {
        // 只取文件名部分，避免建议名里带路径跳出目录
        let file_name = Path::new(suggested_file_name).file_name()?;
        Some(self.dir.join(file_name))
    }
}

/// 待保存的数据。
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub bytes: Vec<u8>,
    pub suggested_file_name: String,
}

impl SaveRequest {
    /// 以处理结果构造保存请求，文件名为 `image_{宽}_{高}.png`。
    pub fn from_result(result: &ProcessingResult) -> Self {
        Self {
            bytes: result.raster.clone(),
            suggested_file_name: result.suggested_file_name(),
        }
    }
}

impl From<SaveRequest> for SaveImagePayload {
    fn from(request: SaveRequest) -> Self {
        Self {
            array_buffer: request.bytes,
            suggested_file_name: request.suggested_file_name,
        }
    }
}

/// 询问路径并写入文件。
///
/// # 返回
/// - `Ok(Some(path))` — 已写入
/// - `Ok(None)` — 用户取消
/// - `Err(ImageError::FileSystem)` — 写入失败
pub(crate) fn save_image(
    prompt: &dyn SavePrompt,
    payload: SaveImagePayload,
) -> Result<Option<PathBuf>, ImageError> {
    if payload.array_buffer.is_empty() {
        return Err(ImageError::InvalidInput("待保存的图片内容为空".to_string()));
    }

    let Some(path) = prompt.choose_save_path(&payload.suggested_file_name) else {
        log::info!("💾 用户取消保存 - 建议文件名: {}", payload.suggested_file_name);
        return Ok(None);
    };

    fs::write(&path, &payload.array_buffer).map_err(|e| {
        ImageError::FileSystem(format!("写入文件 '{}' 失败：{}", path.display(), e))
    })?;

    log::info!(
        "💾 图片已保存 - 路径: {} 大小: {}KB",
        path.display(),
        payload.array_buffer.len() / 1024
    );
    Ok(Some(path))
}
