//! # 加载与校验模块
//!
//! ## 设计思路
//!
//! 统一处理 Data URL 与原始字节的加载，并在“尽可能早”的阶段执行输入校验。
//! 目标是尽快失败，减少不必要内存与 CPU 消耗。
//!
//! ## 实现思路
//!
//! - Data URL：格式解析 + 解码前按 Base64 长度估算体积。
//! - 字节：体积限制 + 文件签名（magic bytes）校验。

use base64::{Engine as _, engine::general_purpose};

use super::{Compositor, ImageError, ProcessorConfig, RawImageData};

const BASE64_MARKER: &str = ";base64,";
const FALLBACK_MIME: &str = "application/octet-stream";

impl Compositor {
    /// 从内存字节加载图片（请求方已经持有的原图）。
    pub(crate) fn load_from_bytes(
        &self,
        bytes: Vec<u8>,
        config: &ProcessorConfig,
    ) -> Result<RawImageData, ImageError> {
        log::debug!("📝 开始处理图片字节 - {} 字节", bytes.len());

        if bytes.len() as u64 > config.max_file_size {
            return Err(ImageError::ResourceLimit(format!(
                "图片体积过大：{:.2} MB（限制：{:.2} MB）",
                bytes.len() as f64 / 1024.0 / 1024.0,
                config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }
        Self::validate_image_signature(&bytes)?;

        Ok(RawImageData {
            bytes,
            source_hint: "bytes",
        })
    }

    /// 解析 Data URL（也接受纯 Base64），不限制体积。
    pub fn parse_data_url(data: &str) -> Result<Vec<u8>, ImageError> {
        Self::parse_data_url_with_limit(data, u64::MAX)
    }

    /// 将字节编码为 Data URL，MIME 由文件签名推断。
    pub fn encode_data_url(bytes: &[u8]) -> String {
        let mime = infer::get(bytes)
            .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
            .map(|kind| kind.mime_type())
            .unwrap_or(FALLBACK_MIME);

        format!(
            "data:{};base64,{}",
            mime,
            general_purpose::STANDARD.encode(bytes)
        )
    }

    fn estimate_base64_decoded_upper_bound_len(base64_data: &str) -> Result<u64, ImageError> {
        let len = base64_data.trim().len() as u64;
        let groups = len
            .checked_add(3)
            .ok_or_else(|| ImageError::ResourceLimit("Base64 输入长度溢出".to_string()))?
            / 4;

        groups
            .checked_mul(3)
            .ok_or_else(|| ImageError::ResourceLimit("Base64 解码体积估算溢出".to_string()))
    }

    /// 解析 Data URL，并在解码前按估算体积拒绝超限输入。
    pub(crate) fn parse_data_url_with_limit(
        data: &str,
        max_file_size: u64,
    ) -> Result<Vec<u8>, ImageError> {
        let normalized = data.trim();

        let base64_data = if normalized.starts_with("data:") {
            let marker = normalized
                .find(BASE64_MARKER)
                .ok_or_else(|| ImageError::InvalidFormat("Data URL 缺少 base64 标记".to_string()))?;
            &normalized[marker + BASE64_MARKER.len()..]
        } else {
            normalized
        };

        if base64_data.is_empty() {
            return Err(ImageError::InvalidFormat("Data URL 内容为空".to_string()));
        }

        let estimated_len = Self::estimate_base64_decoded_upper_bound_len(base64_data)?;
        if estimated_len > max_file_size {
            return Err(ImageError::ResourceLimit(format!(
                "Base64 预计解码体积过大：{:.2} MB（限制：{:.2} MB）",
                estimated_len as f64 / 1024.0 / 1024.0,
                max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        general_purpose::STANDARD
            .decode(base64_data)
            .map_err(|e| ImageError::Decode(format!("Base64 解码失败：{}", e)))
    }

    /// 通过文件签名（magic bytes）校验输入是否为图片。
    fn validate_image_signature(bytes: &[u8]) -> Result<(), ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::InvalidFormat("图片内容为空".to_string()));
        }

        let kind = infer::get(bytes)
            .ok_or_else(|| ImageError::InvalidFormat("无法识别图片类型".to_string()))?;

        if kind.matcher_type() != infer::MatcherType::Image {
            return Err(ImageError::InvalidFormat(format!(
                "文件签名不是图片类型：{}",
                kind.mime_type()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    #[test]
    fn load_from_bytes_rejects_non_image_payload() {
        let compositor = Compositor::default();
        let config = ProcessorConfig::default();

        let result = compositor.load_from_bytes(b"Hello".to_vec(), &config);

        assert!(matches!(result, Err(ImageError::InvalidFormat(_))));
    }

    #[test]
    fn load_from_bytes_rejects_empty_payload() {
        let compositor = Compositor::default();

        let result = compositor.load_from_bytes(Vec::new(), &ProcessorConfig::default());

        assert!(matches!(result, Err(ImageError::InvalidFormat(_))));
    }

    #[test]
    fn load_from_bytes_rejects_oversized_payload() {
        let compositor = Compositor::default();
        let config = ProcessorConfig {
            max_file_size: 4,
            ..ProcessorConfig::default()
        };

        let result = compositor.load_from_bytes(PNG_SIGNATURE.to_vec(), &config);

        assert!(matches!(result, Err(ImageError::ResourceLimit(_))));
    }

    #[test]
    fn parse_data_url_with_limit_rejects_large_payload_before_decode() {
        let huge = format!("data:image/png;base64,{}", "A".repeat(1024 * 1024));
        let result = Compositor::parse_data_url_with_limit(&huge, 32);

        assert!(matches!(result, Err(ImageError::ResourceLimit(_))));
    }

    #[test]
    fn parse_data_url_requires_base64_marker() {
        let result = Compositor::parse_data_url("data:image/png,abcd");

        assert!(matches!(result, Err(ImageError::InvalidFormat(_))));
    }

    #[test]
    fn parse_data_url_reports_bad_base64() {
        let result = Compositor::parse_data_url("data:image/png;base64,@@@@");

        assert!(matches!(result, Err(ImageError::Decode(_))));
    }

    #[test]
    fn data_url_encoding_uses_sniffed_mime() {
        let url = Compositor::encode_data_url(&PNG_SIGNATURE);
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(Compositor::parse_data_url(&url).expect("parse"), PNG_SIGNATURE.to_vec());

        let unknown = Compositor::encode_data_url(b"plain text");
        assert!(unknown.starts_with("data:application/octet-stream;base64,"));
    }

    #[test]
    fn plain_base64_is_accepted() {
        assert_eq!(Compositor::parse_data_url("SGVsbG8=").expect("parse"), b"Hello".to_vec());
    }
}
