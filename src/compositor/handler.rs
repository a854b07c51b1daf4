//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `Compositor` 只负责流程编排与配置管理，不关心请求从哪里来。
//! 处理链路固定为：
//! 1. 读取配置快照
//! 2. 校验参数并加载原始字节
//! 3. 解码为 RGBA
//! 4. 计算画布布局并渲染
//! 5. 编码为 PNG
//!
//! ## 实现思路
//!
//! - 配置通过 `RwLock<ProcessorConfig>` 支持运行时替换。
//! - 单次请求内使用“同一配置快照”，避免处理中途配置漂移。
//! - 记录 `load/decode/render/encode/total` 阶段耗时，便于性能诊断。

use std::sync::RwLock;
use std::time::Instant;

use super::{
    ImageError, OutputEncoding, ProcessingRequest, ProcessingResult, ProcessorConfig, plan_canvas,
    render_canvas,
};

/// 图片合成器。
pub struct Compositor {
    config: RwLock<ProcessorConfig>,
}

impl Default for Compositor {
    fn default() -> Self {
        Self {
            config: RwLock::new(ProcessorConfig::default()),
        }
    }
}

impl Compositor {
    /// 根据初始配置创建合成器，配置非法时直接拒绝。
    ///
    /// # 示例
    /// ```rust
    /// use aspect_border::compositor::{Compositor, ProcessorConfig};
    ///
    /// let compositor = Compositor::new(ProcessorConfig::default())?;
    /// # Ok::<(), aspect_border::compositor::ImageError>(())
    /// ```
    pub fn new(config: ProcessorConfig) -> Result<Self, ImageError> {
        config.validate()?;
        Ok(Self {
            config: RwLock::new(config),
        })
    }

    /// 获取配置快照。
    ///
    /// 作用：保证单次请求链路使用一致参数。
    pub fn config_snapshot(&self) -> Result<ProcessorConfig, ImageError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| ImageError::Internal("配置读取锁已中毒".to_string()))
    }

    /// 替换配置。新配置先校验，失败时保留旧配置。
    pub fn set_config(&self, config: ProcessorConfig) -> Result<(), ImageError> {
        config.validate()?;
        let mut current = self
            .config
            .write()
            .map_err(|_| ImageError::Internal("配置写入锁已中毒".to_string()))?;
        *current = config;

        log::info!(
            "⚙️ 已更新合成配置（max_file_size={}, max_decoded_pixels={}, max_output_pixels={}, max_border={}）",
            current.max_file_size,
            current.max_decoded_pixels,
            current.max_output_pixels,
            current.max_border_thickness
        );
        Ok(())
    }

    /// 处理主入口：消费请求，产出独立的 PNG 结果。
    ///
    /// 任何失败都是该请求的终态，不做重试。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use aspect_border::compositor::{AspectRatio, Compositor, ProcessingRequest};
    ///
    /// let bytes = std::fs::read("photo.png").expect("read input");
    /// let request = ProcessingRequest::new(bytes)
    ///     .with_aspect_ratio(AspectRatio::new(1.0, 1.0))
    ///     .with_border_thickness(16);
    /// let result = Compositor::default().process(request)?;
    /// # Ok::<(), aspect_border::compositor::ImageError>(())
    /// ```
    pub fn process(&self, request: ProcessingRequest) -> Result<ProcessingResult, ImageError> {
        let config = self.config_snapshot()?;
        self.process_with_config(request, &config)
    }

    /// 使用调用方给出的配置快照处理请求。
    ///
    /// 桥接层在解析 Data URL 时已经取过一次快照，这里沿用同一份，不再重新读取。
    pub(crate) fn process_with_config(
        &self,
        request: ProcessingRequest,
        config: &ProcessorConfig,
    ) -> Result<ProcessingResult, ImageError> {
        let total_start = Instant::now();

        if request.border_thickness > config.max_border_thickness {
            return Err(ImageError::ResourceLimit(format!(
                "边框过厚：{} 像素（限制：{} 像素）",
                request.border_thickness, config.max_border_thickness
            )));
        }

        let load_start = Instant::now();
        let raw = self.load_from_bytes(request.image_bytes, config)?;
        let load_elapsed = load_start.elapsed();

        let decode_start = Instant::now();
        let source = self.decode_source(raw, config)?;
        let decode_elapsed = decode_start.elapsed();

        let render_start = Instant::now();
        let plan = plan_canvas(
            source.width(),
            source.height(),
            request.aspect_ratio,
            request.border_thickness,
        )?;
        self.validate_output_limits(&plan, config)?;
        let canvas = render_canvas(&source, &plan, request.border_color);
        let render_elapsed = render_start.elapsed();

        let encode_start = Instant::now();
        let encoding = OutputEncoding::Png;
        let raster = Self::encode_canvas(canvas, encoding)?;
        let encode_elapsed = encode_start.elapsed();

        log::info!(
            "✅ 图片合成完成 - {}x{} -> {}x{} load={}ms decode={}ms render={}ms encode={}ms total={}ms",
            source.width(),
            source.height(),
            plan.canvas_width,
            plan.canvas_height,
            load_elapsed.as_millis(),
            decode_elapsed.as_millis(),
            render_elapsed.as_millis(),
            encode_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(ProcessingResult {
            raster,
            encoding,
            width: plan.canvas_width,
            height: plan.canvas_height,
        })
    }
}
