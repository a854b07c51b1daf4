//! 设置文件模块
//!
//! 合成配置以 JSON 形式保存。文件不存在时使用默认配置；
//! 文件存在但内容非法时报错，而不是静默回退，避免用户以为设置已生效。

use std::fs;
use std::path::Path;

use crate::compositor::ProcessorConfig;
use crate::error::AppError;

/// 从指定路径加载合成配置。
pub fn load_config(path: &Path) -> Result<ProcessorConfig, AppError> {
    if !path.exists() {
        log::info!("⚙️ 设置文件不存在，使用默认配置 - 路径: {}", path.display());
        return Ok(ProcessorConfig::default());
    }

    let content = fs::read_to_string(path)?;
    let config = serde_json::from_str::<ProcessorConfig>(&content)
        .map_err(|e| AppError::Settings(format!("解析设置文件失败: {}", e)))?;
    config.validate()?;

    log::info!("⚙️ 已加载设置文件 - 路径: {}", path.display());
    Ok(config)
}

/// 将合成配置写入指定路径（格式化 JSON）。
pub fn save_config(path: &Path, config: &ProcessorConfig) -> Result<(), AppError> {
    config.validate()?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| AppError::Settings(format!("序列化设置失败: {}", e)))?;
    fs::write(path, content)?;
    Ok(())
}
