//! # 数据模型
//!
//! ## 设计思路
//!
//! 将“外部请求参数”和“流水线中间结果”解耦：
//! - `AspectRatio` / `Color` 表示用户在界面上填写的参数
//! - `ProcessingRequest` 表示一次提交（不可变，构造后只读）
//! - `RawImageData` 表示已加载但未解码的字节
//! - `ProcessingResult` 表示编码完成、可直接保存的输出

use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose};
use image::Rgba;
use serde::{Deserialize, Serialize};

use super::{Compositor, ImageError};

/// 目标宽高比。
///
/// 任一分量为 0、负数或非有限值时视为“未设置”，此时沿用原图比例，只加边框。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AspectRatio {
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl AspectRatio {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// “未设置”比例：`{0, 0}`。
    pub const fn unset() -> Self {
        Self::new(0.0, 0.0)
    }

    /// 两个分量都是有限正数时返回 `width / height`，否则返回 `None`。
    ///
    /// 只有一个分量为 0 时同样返回 `None`，不会出现除零。
    pub fn ratio(&self) -> Option<f64> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if valid(self.width) && valid(self.height) {
            Some(self.width / self.height)
        } else {
            None
        }
    }

    /// 解析 `W:H` 形式的比例字符串，例如 `16:9`、`1:1`、`0:0`。
    pub fn parse(text: &str) -> Result<Self, ImageError> {
        let (w, h) = text
            .trim()
            .split_once(':')
            .ok_or_else(|| ImageError::InvalidInput(format!("比例格式应为 W:H：{}", text)))?;

        let parse_part = |part: &str| {
            part.trim()
                .parse::<f64>()
                .map_err(|e| ImageError::InvalidInput(format!("比例分量无效 '{}'：{}", part, e)))
        };

        Ok(Self::new(parse_part(w)?, parse_part(h)?))
    }
}

fn default_alpha() -> f64 {
    1.0
}

/// 边框颜色。`a` 取值 0~1，缺省为完全不透明。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "default_alpha")]
    pub a: f64,
}

impl Default for Color {
    fn default() -> Self {
        Self::rgb(0, 0, 0)
    }
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// 解析颜色选择器输出的 `#rrggbb`，alpha 固定为 1。
    pub fn from_hex(hex: &str) -> Result<Self, ImageError> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ImageError::InvalidInput(format!("颜色格式应为 #rrggbb：{}", hex)));
        }

        let value = u32::from_str_radix(digits, 16)
            .map_err(|e| ImageError::InvalidInput(format!("颜色解析失败 '{}'：{}", hex, e)))?;

        Ok(Self::rgb(
            ((value >> 16) & 0xff) as u8,
            ((value >> 8) & 0xff) as u8,
            (value & 0xff) as u8,
        ))
    }

    /// 转为 8 位 RGBA 像素。alpha 先夹到 `[0, 1]`，NaN 按不透明处理。
    pub fn to_rgba8(&self) -> Rgba<u8> {
        let alpha = if self.a.is_nan() {
            u8::MAX
        } else {
            (self.a.clamp(0.0, 1.0) * 255.0).round() as u8
        };
        Rgba([self.r, self.g, self.b, alpha])
    }
}

/// 输出编码格式。目前固定为 PNG（无损）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputEncoding {
    #[default]
    Png,
}

impl OutputEncoding {
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
        }
    }

    pub(crate) fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
        }
    }
}

/// 一次处理请求。
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingRequest {
    pub image_bytes: Vec<u8>,
    pub aspect_ratio: AspectRatio,
    pub border_thickness: u32,
    pub border_color: Color,
}

impl ProcessingRequest {
    /// 以默认参数（不改比例、无边框、黑色）包装图片字节。
    pub fn new(image_bytes: Vec<u8>) -> Self {
        Self {
            image_bytes,
            aspect_ratio: AspectRatio::unset(),
            border_thickness: 0,
            border_color: Color::default(),
        }
    }

    pub fn with_aspect_ratio(self, aspect_ratio: AspectRatio) -> Self {
        Self { aspect_ratio, ..self }
    }

    pub fn with_border_thickness(self, border_thickness: u32) -> Self {
        Self {
            border_thickness,
            ..self
        }
    }

    pub fn with_border_color(self, border_color: Color) -> Self {
        Self {
            border_color,
            ..self
        }
    }
}

/// 处理结果：独立持有的编码后字节。
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingResult {
    pub raster: Vec<u8>,
    pub encoding: OutputEncoding,
    pub width: u32,
    pub height: u32,
}

impl ProcessingResult {
    /// 编码为 `data:image/png;base64,...`。
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.encoding.mime_type(),
            general_purpose::STANDARD.encode(&self.raster)
        )
    }

    /// 从回复中的 Data URL 还原结果，并读取图片头中的宽高。
    pub fn from_data_url(data_url: &str) -> Result<Self, ImageError> {
        let raster = Compositor::parse_data_url(data_url)?;
        let (width, height) = image::ImageReader::new(Cursor::new(&raster))
            .with_guessed_format()
            .map_err(|e| ImageError::InvalidFormat(format!("无法识别结果格式：{}", e)))?
            .into_dimensions()
            .map_err(|e| ImageError::Decode(format!("无法读取结果尺寸：{}", e)))?;

        Ok(Self {
            raster,
            encoding: OutputEncoding::Png,
            width,
            height,
        })
    }

    /// 保存时的建议文件名：`image_{宽}_{高}.png`。
    pub fn suggested_file_name(&self) -> String {
        format!(
            "image_{}_{}.{}",
            self.width,
            self.height,
            self.encoding.extension()
        )
    }
}

/// 加载阶段输出：原始字节与来源标识。
pub(crate) struct RawImageData {
    /// 原始图片字节。
    pub(crate) bytes: Vec<u8>,
    /// 来源提示（用于日志与诊断）。
    pub(crate) source_hint: &'static str,
}
