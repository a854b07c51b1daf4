//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调上限”集中到 `ProcessorConfig`，保证运行时行为可观测、可调整、可测试。
//! 合成本身是纯计算，这里只约束输入体积、解码像素与输出画布大小，
//! 防止异常输入（超大图、超厚边框）拖垮进程。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的配置。
//! - `#[serde(default)]` 允许设置文件只写部分字段。
//! - `validate` 在加载设置或替换配置时统一校验。

use serde::{Deserialize, Serialize};

use super::ImageError;

/// 图片合成配置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// 输入图片字节允许的最大体积。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
    /// 输出画布像素上限（含补边与边框）。
    pub max_output_pixels: u64,
    /// 单侧边框厚度上限（像素）。
    pub max_border_thickness: u32,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            max_output_pixels: 80_000_000,
            max_border_thickness: 10_000,
        }
    }
}

impl ProcessorConfig {
    /// 校验配置取值范围。
    pub fn validate(&self) -> Result<(), ImageError> {
        if self.max_file_size == 0 {
            return Err(ImageError::InvalidInput("max_file_size 必须大于 0".to_string()));
        }
        if self.max_decoded_pixels == 0 {
            return Err(ImageError::InvalidInput("max_decoded_pixels 必须大于 0".to_string()));
        }
        if self.max_decoded_bytes < 1024 * 1024 {
            return Err(ImageError::InvalidInput("max_decoded_bytes 不能小于 1MB".to_string()));
        }
        if self.max_output_pixels < self.max_decoded_pixels {
            return Err(ImageError::InvalidInput(
                "max_output_pixels 不能小于 max_decoded_pixels".to_string(),
            ));
        }
        Ok(())
    }
}
