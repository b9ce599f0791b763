//! ドラフト永続化ストア
//!
//! 固定キー `energy-audit-draft` に1件だけスナップショットを保持する
//! 容量制限付きストア。書き込みは一時ファイル経由のrenameで、
//! 読み出しは常に「最後に完了した保存」を返す（途中状態は見えない）。

use crate::error::{AuditError, Result};
use crate::record::AuditRecord;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// ストアのキー。ファイル名にもそのまま使う
pub const DRAFT_KEY: &str = "energy-audit-draft";

/// 既定の容量上限（5MiB。写真の蓄積で超過しうる）
pub const DEFAULT_CAPACITY: usize = 5 * 1024 * 1024;

pub struct DraftStore {
    dir: PathBuf,
    capacity: usize,
    /// 破壊的リセット進行中フラグ。クリア直後の自動保存で
    /// 削除が巻き戻るのを防ぐ
    clearing: AtomicBool,
}

impl DraftStore {
    /// 既定の保存先（~/.config/energy-audit）で開く
    pub fn open_default() -> Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| {
            AuditError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "ホームディレクトリが見つかりません",
            ))
        })?;
        Ok(Self::open(home.join(".config").join("energy-audit")))
    }

    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            capacity: DEFAULT_CAPACITY,
            clearing: AtomicBool::new(false),
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn entry_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", DRAFT_KEY))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn exists(&self) -> bool {
        self.entry_path().exists()
    }

    /// スナップショットを保存する。
    /// - クリア進行中はスキップして Ok(false)
    /// - 容量超過は QuotaExceeded（既存の保存内容は残る）
    pub fn save(&self, record: &AuditRecord) -> Result<bool> {
        if self.clearing.load(Ordering::SeqCst) {
            return Ok(false);
        }

        let json = serde_json::to_string(record)?;
        if json.len() > self.capacity {
            return Err(AuditError::QuotaExceeded { size: json.len() });
        }

        fs::create_dir_all(&self.dir)?;
        let tmp = self.dir.join(format!("{}.json.tmp", DRAFT_KEY));
        fs::write(&tmp, &json)?;
        fs::rename(&tmp, self.entry_path())?;
        Ok(true)
    }

    /// 最後に保存されたスナップショットを返す。
    /// 破損エントリは警告を出して破棄し、空として扱う
    pub fn load(&self) -> Option<AuditRecord> {
        match self.read_entry() {
            Ok(record) => record,
            Err(AuditError::Corrupt(reason)) => {
                eprintln!("保存データが破損していたため破棄します: {}", reason);
                let _ = fs::remove_file(self.entry_path());
                None
            }
            Err(_) => None,
        }
    }

    fn read_entry(&self) -> Result<Option<AuditRecord>> {
        let path = self.entry_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| AuditError::Corrupt(e.to_string()))
    }

    /// エントリを削除する。削除前にクリアフラグを立て、
    /// 後続の自動保存（終了時保存を含む）を抑止する
    pub fn clear(&self) -> Result<bool> {
        self.clearing.store(true, Ordering::SeqCst);
        let path = self.entry_path();
        if path.exists() {
            fs::remove_file(&path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// クリア完了後に保存を再度有効化する
    pub fn end_clear(&self) {
        self.clearing.store(false, Ordering::SeqCst);
    }

    pub fn is_clearing(&self) -> bool {
        self.clearing.load(Ordering::SeqCst)
    }
}
