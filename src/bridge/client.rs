//! # 请求方句柄（BridgeClient）
//!
//! ## 设计思路
//!
//! 界面侧通过 `BridgeClient` 向特权侧发请求，不直接接触合成器。
//! 同一时间只允许一个请求在途：第二次提交立即返回 `BridgeError::Busy`，
//! 而不是排队或与上一个回复竞争。
//!
//! ## 实现思路
//!
//! - 在途标志使用 `AtomicBool`，由 `InFlightGuard`（RAII）负责释放，
//!   即使等待回复的 future 被丢弃也能恢复。
//! - 每次请求携带一个 `oneshot` 回复口，天然“恰好一次”。
//! - `submit_with` 提供回调形式：注册一次性续体，回复到达时触发。
//!   任务经后端启动时记录的运行时句柄派发，调用方线程不需要处在 tokio 上下文中。

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::compositor::{ProcessingRequest, ProcessingResult};

use super::error::BridgeError;
use super::messages::{Envelope, ProcessImagePayload, ReplyMessage, RequestMessage};
use super::save::SaveRequest;

/// 在途请求守卫：构造时占位，`Drop` 时释放。
struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Result<Self, BridgeError> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| {
                log::warn!("🚫 已有请求在途，拒绝新的提交");
                BridgeError::Busy
            })?;
        Ok(Self {
            flag: Arc::clone(flag),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// 请求方句柄，可克隆；所有克隆共享同一个在途标志。
#[derive(Clone)]
pub struct BridgeClient {
    sender: mpsc::Sender<Envelope>,
    events: broadcast::Sender<ReplyMessage>,
    in_flight: Arc<AtomicBool>,
    runtime: Handle,
}

impl BridgeClient {
    pub(crate) fn new(
        sender: mpsc::Sender<Envelope>,
        events: broadcast::Sender<ReplyMessage>,
        runtime: Handle,
    ) -> Self {
        Self {
            sender,
            events,
            in_flight: Arc::new(AtomicBool::new(false)),
            runtime,
        }
    }

    /// 当前是否有请求在途（界面可据此禁用“处理”按钮）。
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// 订阅回复事件流。
    pub fn subscribe(&self) -> broadcast::Receiver<ReplyMessage> {
        self.events.subscribe()
    }

    /// 提交处理请求并等待唯一回复。
    pub async fn submit(
        &self,
        request: ProcessingRequest,
    ) -> Result<ProcessingResult, BridgeError> {
        let guard = InFlightGuard::acquire(&self.in_flight)?;
        self.process_with_guard(guard, request).await
    }

    /// 提交处理请求，并注册一次性续体；回复到达时在后台任务中调用。
    ///
    /// 在途检查同步完成：已有请求时直接返回 `Busy`，续体不会被调用。
    /// 可以在任意线程调用，包括没有 tokio 运行时的界面线程。
    pub fn submit_with<F>(
        &self,
        request: ProcessingRequest,
        continuation: F,
    ) -> Result<(), BridgeError>
    where
        F: FnOnce(Result<ProcessingResult, BridgeError>) + Send + 'static,
    {
        let guard = InFlightGuard::acquire(&self.in_flight)?;
        let client = self.clone();
        self.runtime.spawn(async move {
            let outcome = client.process_with_guard(guard, request).await;
            continuation(outcome);
        });
        Ok(())
    }

    /// 请求保存图片。
    ///
    /// # 返回
    /// - `Ok(Some(path))` — 收到 `image-saved`
    /// - `Ok(None)` — 用户取消，没有回复消息
    /// - `Err(BridgeError::Rejected)` — 收到 `image-save-failed`
    pub async fn save(&self, request: SaveRequest) -> Result<Option<PathBuf>, BridgeError> {
        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        match self.round_trip(RequestMessage::SaveImage(request.into())).await? {
            Some(ReplyMessage::ImageSaved(path)) => Ok(Some(PathBuf::from(path))),
            Some(ReplyMessage::ImageSaveFailed(err)) => Err(BridgeError::Rejected(err)),
            Some(other) => Err(BridgeError::UnexpectedReply(other.channel())),
            None => Ok(None),
        }
    }

    async fn process_with_guard(
        &self,
        _guard: InFlightGuard,
        request: ProcessingRequest,
    ) -> Result<ProcessingResult, BridgeError> {
        let payload = ProcessImagePayload::from_request(&request);

        match self.round_trip(RequestMessage::ProcessImage(payload)).await? {
            Some(ReplyMessage::ImageProcessed(data_url)) => {
                Ok(ProcessingResult::from_data_url(&data_url)?)
            }
            Some(ReplyMessage::ImageProcessFailed(err)) => Err(BridgeError::Rejected(err)),
            Some(other) => Err(BridgeError::UnexpectedReply(other.channel())),
            None => Err(BridgeError::UnexpectedReply("<none>")),
        }
    }

    async fn round_trip(
        &self,
        message: RequestMessage,
    ) -> Result<Option<ReplyMessage>, BridgeError> {
        let channel = message.channel();
        let (reply, receiver) = oneshot::channel();

        log::debug!("📨 发送请求 - 通道: {}", channel);
        self.sender
            .send(Envelope { message, reply })
            .await
            .map_err(|_| BridgeError::Disconnected)?;

        receiver.await.map_err(|_| BridgeError::Disconnected)
    }
}
