//! # 解码与渲染流水线模块
//!
//! ## 设计思路
//!
//! 将“字节 → 图像 → 画布 → PNG”的过程集中管理，并在关键节点增加资源上限控制。
//! 优先做尺寸检查，再进行完整解码，降低恶意输入触发高内存开销的风险。
//!
//! ## 实现思路
//!
//! 1. 猜测格式并读取 header 尺寸
//! 2. 按像素上限快速拒绝
//! 3. 完整解码并统一转为 RGBA8
//! 4. 用边框色铺满画布，再把原图原样拷贝到偏移位置（不做 alpha 混合）
//! 5. 编码为 PNG

use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageFormat, RgbaImage, imageops};

use super::{
    CanvasPlan, Color, Compositor, ImageError, OutputEncoding, ProcessorConfig, RawImageData,
};

impl Compositor {
    /// 将原始字节解码为 RGBA 图像。
    pub(crate) fn decode_source(
        &self,
        raw: RawImageData,
        config: &ProcessorConfig,
    ) -> Result<RgbaImage, ImageError> {
        let _format: ImageFormat = image::guess_format(&raw.bytes)
            .map_err(|e| ImageError::InvalidFormat(format!("不支持的图片格式：{}", e)))?;

        let (header_width, header_height) = Self::inspect_dimensions_from_memory(&raw.bytes)?;
        Self::validate_pixel_limits(config, header_width, header_height)?;
        Self::validate_decoded_memory_limits(config, header_width, header_height)?;

        let decoded = image::load_from_memory(&raw.bytes)
            .map_err(|e| ImageError::Decode(format!("图片解码失败：{}", e)))?;

        let (width, height) = decoded.dimensions();
        Self::validate_pixel_limits(config, width, height)?;
        Self::validate_decoded_memory_limits(config, width, height)?;

        log::debug!(
            "🧩 图片解码成功 - 来源: {} 尺寸: {}x{} 色彩: {:?}",
            raw.source_hint,
            width,
            height,
            decoded.color()
        );

        Ok(decoded.to_rgba8())
    }

    /// 仅通过内存中的图片头信息读取宽高。
    ///
    /// 用于在完整解码前做像素限制检查。
    fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), ImageError> {
        image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ImageError::InvalidFormat(format!("无法识别图片格式：{}", e)))?
            .into_dimensions()
            .map_err(|e| ImageError::Decode(format!("无法读取图片尺寸：{}", e)))
    }

    /// 校验像素数量是否超过配置上限。
    fn validate_pixel_limits(
        config: &ProcessorConfig,
        width: u32,
        height: u32,
    ) -> Result<(), ImageError> {
        let pixels = width as u64 * height as u64;

        if pixels > config.max_decoded_pixels {
            return Err(ImageError::ResourceLimit(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, config.max_decoded_pixels
            )));
        }

        Ok(())
    }

    fn validate_decoded_memory_limits(
        config: &ProcessorConfig,
        width: u32,
        height: u32,
    ) -> Result<(), ImageError> {
        let estimated = (width as u64)
            .checked_mul(height as u64)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(|| ImageError::ResourceLimit("图片解码内存估算溢出".to_string()))?;

        if estimated > config.max_decoded_bytes {
            return Err(ImageError::ResourceLimit(format!(
                "图片解码预计内存过大：{:.2} MB（限制：{:.2} MB）",
                estimated as f64 / 1024.0 / 1024.0,
                config.max_decoded_bytes as f64 / 1024.0 / 1024.0
            )));
        }

        Ok(())
    }

    /// 校验输出画布是否超过像素上限。
    pub(crate) fn validate_output_limits(
        &self,
        plan: &CanvasPlan,
        config: &ProcessorConfig,
    ) -> Result<(), ImageError> {
        let pixels = plan.canvas_pixels();
        if pixels > config.max_output_pixels {
            log::warn!(
                "⚠️ 输出画布超限：{}x{}（限制 {} 像素）",
                plan.canvas_width,
                plan.canvas_height,
                config.max_output_pixels
            );
            return Err(ImageError::ResourceLimit(format!(
                "输出画布过大：{} 像素（限制：{} 像素）",
                pixels, config.max_output_pixels
            )));
        }
        Ok(())
    }

    /// 将画布编码为指定格式的字节。
    pub(crate) fn encode_canvas(
        canvas: RgbaImage,
        encoding: OutputEncoding,
    ) -> Result<Vec<u8>, ImageError> {
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(canvas)
            .write_to(&mut cursor, encoding.image_format())
            .map_err(|e| ImageError::Encode(format!("{} 编码失败：{}", encoding.mime_type(), e)))?;
        Ok(cursor.into_inner())
    }
}

/// 按布局渲染画布：整幅铺边框色，再把原图拷贝到 `(offset_x, offset_y)`。
///
/// 原图像素原样写入（不与边框色混合），透明像素保持透明。
pub fn render_canvas(source: &RgbaImage, plan: &CanvasPlan, color: Color) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(plan.canvas_width, plan.canvas_height, color.to_rgba8());
    imageops::replace(
        &mut canvas,
        source,
        plan.offset_x as i64,
        plan.offset_y as i64,
    );
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::{AspectRatio, plan_canvas};
    use image::Rgba;

    #[test]
    fn render_fills_padding_and_keeps_source_pixels() {
        let source = RgbaImage::from_pixel(4, 2, Rgba([10, 20, 30, 255]));
        let plan = plan_canvas(4, 2, AspectRatio::new(1.0, 1.0), 1).expect("plan");
        let canvas = render_canvas(&source, &plan, Color::rgb(200, 0, 0));

        assert_eq!(canvas.dimensions(), (6, 6));
        assert_eq!(canvas.get_pixel(0, 0), &Rgba([200, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(3, 1), &Rgba([200, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(1, 2), &Rgba([10, 20, 30, 255]));
        assert_eq!(canvas.get_pixel(4, 3), &Rgba([10, 20, 30, 255]));
        assert_eq!(canvas.get_pixel(1, 4), &Rgba([200, 0, 0, 255]));
    }

    #[test]
    fn render_copies_transparent_pixels_verbatim() {
        let source = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        let plan = plan_canvas(2, 2, AspectRatio::unset(), 1).expect("plan");
        let canvas = render_canvas(&source, &plan, Color::rgb(9, 9, 9).with_alpha(0.5));

        assert_eq!(canvas.get_pixel(0, 0), &Rgba([9, 9, 9, 128]));
        assert_eq!(canvas.get_pixel(1, 1), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn decode_rejects_too_many_pixels() {
        let compositor = Compositor::default();
        let config = ProcessorConfig {
            max_decoded_pixels: 100,
            max_output_pixels: 100,
            ..ProcessorConfig::default()
        };
        let bytes = Compositor::encode_canvas(
            RgbaImage::from_pixel(20, 20, Rgba([1, 2, 3, 255])),
            OutputEncoding::Png,
        )
        .expect("encode");

        let result = compositor.decode_source(
            RawImageData {
                bytes,
                source_hint: "test",
            },
            &config,
        );

        assert!(matches!(result, Err(ImageError::ResourceLimit(_))));
    }

    #[test]
    fn decode_converts_rgb_to_rgba() {
        let rgb = image::RgbImage::from_pixel(3, 2, image::Rgb([7, 8, 9]));
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(rgb)
            .write_to(&mut cursor, ImageFormat::Png)
            .expect("encode rgb");

        let decoded = Compositor::default()
            .decode_source(
                RawImageData {
                    bytes: cursor.into_inner(),
                    source_hint: "test",
                },
                &ProcessorConfig::default(),
            )
            .expect("decode");

        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(2, 1), &Rgba([7, 8, 9, 255]));
    }
}
