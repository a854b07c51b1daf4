//! # 比例补边工具 — 命令行入口
//!
//! 本文件扮演“界面侧”：读取参数组装表单状态，经桥接层提交处理，再请求保存。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use aspect_border::bridge::{Backend, DirectoryPrompt, FixedPathPrompt, SavePrompt, SaveRequest};
use aspect_border::compositor::{AspectRatio, Color, ProcessorConfig};
use aspect_border::editor::{EditorAction, EditorState};
use aspect_border::error::AppError;
use aspect_border::settings;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "aspect-border",
    version,
    about = "Pad an image to an aspect ratio with a solid border"
)]
struct Cli {
    /// Input image path.
    input: PathBuf,

    /// Output PNG path. If it is a directory, `image_{width}_{height}.png` is used.
    #[arg(short, long)]
    output: PathBuf,

    /// Target aspect ratio as W:H. `0:0` keeps the image's own ratio.
    #[arg(long, default_value = "0:0")]
    ratio: String,

    /// Border thickness in pixels.
    #[arg(long, default_value_t = 0)]
    border: u32,

    /// Border color as #rrggbb.
    #[arg(long, default_value = "#000000")]
    color: String,

    /// Border alpha in [0, 1].
    #[arg(long, default_value_t = 1.0)]
    alpha: f64,

    /// Settings JSON with processing limits.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(Some(path)) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Ok(None) => {
            log::warn!("未保存输出");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("处理失败: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<Option<PathBuf>, AppError> {
    let config = match &cli.config {
        Some(path) => settings::load_config(path)?,
        None => ProcessorConfig::default(),
    };

    let prompt: Arc<dyn SavePrompt> = if cli.output.is_dir() {
        Arc::new(DirectoryPrompt::new(&cli.output))
    } else {
        Arc::new(FixedPathPrompt::new(&cli.output))
    };
    let client = Backend::new(config, prompt)?.spawn();

    let ratio = AspectRatio::parse(&cli.ratio)?;
    let color = Color::from_hex(&cli.color)?;
    let state = EditorState::default()
        .patch(EditorAction::LoadImage(fs::read(&cli.input)?))
        .patch(EditorAction::SetRatioWidth(ratio.width))
        .patch(EditorAction::SetRatioHeight(ratio.height))
        .patch(EditorAction::SetBorderThickness(cli.border))
        .patch(EditorAction::SetBorderRgb {
            r: color.r,
            g: color.g,
            b: color.b,
        })
        .patch(EditorAction::SetBorderAlpha(cli.alpha));

    let result = client.submit(state.to_request()?).await?;
    log::info!(
        "输入: {} -> 输出尺寸 {}x{}",
        cli.input.display(),
        result.width,
        result.height
    );

    Ok(client.save(SaveRequest::from_result(&result)).await?)
}
