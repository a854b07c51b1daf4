//! 编辑状态模块
//!
//! # 设计思路
//!
//! 界面上的表单状态（原图、比例、边框、结果预览）用一个不可变结构表示，
//! 每次用户操作通过纯函数 `patch` 产生新状态，不需要全局可变单例。
//!
//! # 实现思路
//!
//! - 比例宽/高分开修改，修改一侧时保留另一侧。
//! - 颜色选择器只改 RGB，透明度单独修改，互不覆盖。
//! - 更换原图时清空旧的处理结果。

use crate::compositor::{AspectRatio, Color, ImageError, ProcessingRequest, ProcessingResult};

/// 用户操作。
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    LoadImage(Vec<u8>),
    SetRatioWidth(f64),
    SetRatioHeight(f64),
    SetBorderThickness(u32),
    SetBorderRgb { r: u8, g: u8, b: u8 },
    SetBorderAlpha(f64),
    Processed(ProcessingResult),
}

/// 表单状态。初始为：比例 `{0, 0}`、边框 0、不透明黑色。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorState {
    pub image: Option<Vec<u8>>,
    pub processed: Option<ProcessingResult>,
    pub aspect_ratio: AspectRatio,
    pub border_thickness: u32,
    pub border_color: Color,
}

impl EditorState {
    /// 应用一次操作，返回新状态。
    pub fn patch(self, action: EditorAction) -> Self {
        match action {
            EditorAction::LoadImage(bytes) => Self {
                image: Some(bytes),
                processed: None,
                ..self
            },
            EditorAction::SetRatioWidth(width) => Self {
                aspect_ratio: AspectRatio::new(width, self.aspect_ratio.height),
                ..self
            },
            EditorAction::SetRatioHeight(height) => Self {
                aspect_ratio: AspectRatio::new(self.aspect_ratio.width, height),
                ..self
            },
            EditorAction::SetBorderThickness(border_thickness) => Self {
                border_thickness,
                ..self
            },
            EditorAction::SetBorderRgb { r, g, b } => Self {
                border_color: Color::rgb(r, g, b).with_alpha(self.border_color.a),
                ..self
            },
            EditorAction::SetBorderAlpha(a) => Self {
                border_color: self.border_color.with_alpha(a),
                ..self
            },
            EditorAction::Processed(result) => Self {
                processed: Some(result),
                ..self
            },
        }
    }

    /// 由当前表单构造处理请求；尚未选择原图时报错。
    pub fn to_request(&self) -> Result<ProcessingRequest, ImageError> {
        let image = self
            .image
            .clone()
            .ok_or_else(|| ImageError::InvalidInput("尚未选择原图".to_string()))?;

        Ok(ProcessingRequest {
            image_bytes: image,
            aspect_ratio: self.aspect_ratio,
            border_thickness: self.border_thickness,
            border_color: self.border_color,
        })
    }
}
