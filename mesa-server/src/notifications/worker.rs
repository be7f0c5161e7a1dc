//! 通知后台 Worker
//!
//! 从 mpsc 通道消费 Notice，写入 notification 表。
//! 收到 shutdown 信号后先排空通道再退出。

use crate::db::repository::notification;
use crate::utils::SharedClock;
use shared::models::Notice;
use sqlx::SqlitePool;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub struct NotificationWorker {
    pool: SqlitePool,
    clock: SharedClock,
}

impl NotificationWorker {
    pub fn new(pool: SqlitePool, clock: SharedClock) -> Self {
        Self { pool, clock }
    }

    /// 运行 worker（直到通道关闭或 shutdown）
    pub async fn run(self, mut rx: mpsc::Receiver<Notice>, shutdown: CancellationToken) {
        tracing::info!("Notification worker started");

        loop {
            tokio::select! {
                maybe = rx.recv() => match maybe {
                    Some(notice) => self.persist(notice).await,
                    None => {
                        tracing::info!("Notification channel closed, worker stopping");
                        return;
                    }
                },
                _ = shutdown.cancelled() => break,
            }
        }

        // 停止接收，再把已排队的通知写完
        rx.close();
        let mut flushed = 0usize;
        while let Some(notice) = rx.recv().await {
            self.persist(notice).await;
            flushed += 1;
        }
        tracing::info!(flushed, "Notification worker stopped");
    }

    async fn persist(&self, notice: Notice) {
        match notification::insert(&self.pool, &notice, self.clock.now_millis()).await {
            Ok(id) => {
                tracing::debug!(
                    notification_id = id,
                    target_username = %notice.target_username,
                    notification_type = ?notice.notification_type,
                    reference_id = notice.reference_id,
                    "Notification persisted"
                );
            }
            Err(e) => {
                tracing::error!(
                    target_username = %notice.target_username,
                    error = %e,
                    "Failed to persist notification"
                );
            }
        }
    }
}
