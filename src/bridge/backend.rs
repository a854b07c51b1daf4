//! # 特权侧（Backend）
//!
//! ## 设计思路
//!
//! `Backend` 持有合成器与保存对话框接缝，运行在独立的 tokio 任务中，
//! 逐条消费请求通道里的 `Envelope`，每条请求恰好回复一次。
//!
//! ## 实现思路
//!
//! - 合成是 CPU 密集的同步计算，放到 `spawn_blocking`，不阻塞运行时。
//! - 解码/合成失败回复 `image-process-failed`，保存失败回复 `image-save-failed`，
//!   不再让请求方无限等待。
//! - 每条回复同时广播为事件，界面侧可订阅观察。

use std::path::PathBuf;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc};

use crate::compositor::{Compositor, ImageError, ProcessingResult, ProcessorConfig};

use super::client::BridgeClient;
use super::messages::{
    Envelope, ErrorPayload, ProcessImagePayload, ReplyMessage, RequestMessage, SaveImagePayload,
};
use super::save::{SavePrompt, save_image};

const REQUEST_QUEUE_CAPACITY: usize = 4;
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// 处理后端。
pub struct Backend {
    compositor: Arc<Compositor>,
    prompt: Arc<dyn SavePrompt>,
    events: broadcast::Sender<ReplyMessage>,
}

impl Backend {
    /// 以指定配置与保存对话框创建后端。
    pub fn new(config: ProcessorConfig, prompt: Arc<dyn SavePrompt>) -> Result<Self, ImageError> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            compositor: Arc::new(Compositor::new(config)?),
            prompt,
            events,
        })
    }

    /// 合成器句柄（用于运行时替换配置）。
    pub fn compositor(&self) -> Arc<Compositor> {
        Arc::clone(&self.compositor)
    }

    /// 在当前 tokio 运行时上启动后端，返回请求方句柄。
    ///
    /// 必须在运行时上下文中调用；返回的句柄记住该运行时，之后可在任意线程使用。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use std::sync::Arc;
    /// use aspect_border::bridge::{Backend, FixedPathPrompt};
    /// use aspect_border::compositor::ProcessorConfig;
    ///
    /// # async fn demo() -> Result<(), aspect_border::compositor::ImageError> {
    /// let backend = Backend::new(ProcessorConfig::default(), Arc::new(FixedPathPrompt::new("out.png")))?;
    /// let client = backend.spawn();
    /// # Ok(())
    /// # }
    /// ```
    pub fn spawn(self) -> BridgeClient {
        let runtime = Handle::current();
        let (sender, receiver) = mpsc::channel(REQUEST_QUEUE_CAPACITY);
        let client = BridgeClient::new(sender, self.events.clone(), runtime.clone());
        runtime.spawn(self.run(receiver));
        client
    }

    async fn run(self, mut receiver: mpsc::Receiver<Envelope>) {
        log::info!("🚀 处理后端已启动");

        while let Some(Envelope { message, reply }) = receiver.recv().await {
            let channel = message.channel();
            let outcome = self.handle(message).await;

            if let Some(reply_message) = &outcome {
                // 没有订阅者时 send 会失败，属正常情况
                let _ = self.events.send(reply_message.clone());
            }
            if reply.send(outcome).is_err() {
                log::warn!("⚠️ 请求方已放弃等待回复 - 通道: {}", channel);
            }
        }

        log::info!("🛑 请求通道已关闭，处理后端退出");
    }

    /// 处理单条请求。返回 `None` 表示按约定不回复（用户取消保存）。
    pub async fn handle(&self, message: RequestMessage) -> Option<ReplyMessage> {
        match message {
            RequestMessage::ProcessImage(payload) => Some(self.handle_process(payload).await),
            RequestMessage::SaveImage(payload) => self.handle_save(payload).await,
        }
    }

    async fn handle_process(&self, payload: ProcessImagePayload) -> ReplyMessage {
        let compositor = Arc::clone(&self.compositor);
        let outcome =
            tokio::task::spawn_blocking(move || process_with_snapshot(&compositor, payload)).await;

        match outcome {
            Ok(Ok(result)) => ReplyMessage::ImageProcessed(result.to_data_url()),
            Ok(Err(err)) => {
                log::error!("❌ 图片处理失败（{}）：{}", err.code(), err);
                ReplyMessage::ImageProcessFailed(ErrorPayload::from(&err))
            }
            Err(join_err) => {
                log::error!("❌ 图片处理任务异常退出：{}", join_err);
                let err = ImageError::Internal(format!("图片处理任务异常退出：{}", join_err));
                ReplyMessage::ImageProcessFailed(ErrorPayload::from(&err))
            }
        }
    }

    async fn handle_save(&self, payload: SaveImagePayload) -> Option<ReplyMessage> {
        let prompt = Arc::clone(&self.prompt);
        let outcome: Result<Result<Option<PathBuf>, ImageError>, _> =
            tokio::task::spawn_blocking(move || save_image(prompt.as_ref(), payload)).await;

        match outcome {
            Ok(Ok(Some(path))) => {
                Some(ReplyMessage::ImageSaved(path.to_string_lossy().to_string()))
            }
            Ok(Ok(None)) => None,
            Ok(Err(err)) => {
                log::error!("❌ 保存图片失败：{}", err);
                Some(ReplyMessage::ImageSaveFailed(ErrorPayload::from(&err)))
            }
            Err(join_err) => {
                log::error!("❌ 保存任务异常退出：{}", join_err);
                let err = ImageError::Internal(format!("保存任务异常退出：{}", join_err));
                Some(ReplyMessage::ImageSaveFailed(ErrorPayload::from(&err)))
            }
        }
    }
}

/// 每个请求只读取一次配置。
fn process_with_snapshot(
    compositor: &Compositor,
    payload: ProcessImagePayload,
) -> Result<ProcessingResult, ImageError> {
    let config = compositor.config_snapshot()?;
    process_payload(compositor, &config, payload)
}

/// 同一份配置快照既用于 Data URL 体积限制，也用于合成限制。
fn process_payload(
    compositor: &Compositor,
    config: &ProcessorConfig,
    payload: ProcessImagePayload,
) -> Result<ProcessingResult, ImageError> {
    let request = payload.into_request(config.max_file_size)?;
    compositor.process_with_config(request, config)
}
