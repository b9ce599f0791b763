//! 自動保存デバウンサ
//!
//! キー入力のたびに呼ばれても、静止期間（800ms）が経過するまで
//! タスクを実行しない。呼び出しごとに保留中のタイマーを破棄して
//! 張り直すため、タイマーが無制限に積み上がることはない。

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;

/// 静止期間のデフォルト（ミリ秒）
pub const DEBOUNCE_WINDOW_MS: u64 = 800;

pub struct Debouncer {
    window: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}

impl Debouncer {
    pub fn new() -> Self {
        Self::with_window(Duration::from_millis(DEBOUNCE_WINDOW_MS))
    }

    /// テスト等で静止期間を変えたい場合に使う
    pub fn with_window(window: Duration) -> Self {
        Self {
            window,
            pending: Mutex::new(None),
        }
    }

    /// タスクを予約する。静止期間内の再呼び出しは前の予約を無効化し、
    /// 最後に渡されたタスクだけが実行される
    pub fn schedule<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let window = self.window;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            task.await;
        });

        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = pending.replace(handle) {
            previous.abort();
        }
    }

    /// 保留中の予約を破棄する（破壊的リセット時）
    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }
}
