//! 監査セッション
//!
//! フォーム構造木・永続化ストア・自動保存デバウンサを束ね、
//! UI側（CLIや画面）へ境界操作を公開するファサード。
//! 編集 → デバウンス → 抽出 → 保存 の経路はすべてここを通る。

use crate::error::{AuditError, Result};
use crate::export;
use crate::form::{apply_state, extract_state, ApplyOptions, FormTree};
use crate::photo::PhotoPayload;
use crate::record::AuditRecord;
use crate::scheduler::Debouncer;
use crate::store::DraftStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct AuditSession {
    tree: Arc<Mutex<FormTree>>,
    store: Arc<DraftStore>,
    autosave: Arc<Debouncer>,
}

impl AuditSession {
    pub fn new(store: DraftStore) -> Self {
        Self::with_debouncer(store, Debouncer::new())
    }

    /// テスト等でデバウンス間隔を差し替える場合に使う
    pub fn with_debouncer(store: DraftStore, debouncer: Debouncer) -> Self {
        Self {
            tree: Arc::new(Mutex::new(FormTree::new())),
            store: Arc::new(store),
            autosave: Arc::new(debouncer),
        }
    }

    /// ストアの最終スナップショットから復元して開く。
    /// 復元では保存された子要素だけを正確に再現する
    pub async fn open(store: DraftStore) -> Self {
        let session = Self::new(store);
        if let Some(record) = session.store.load() {
            let mut tree = session.tree.lock().await;
            apply_state(&mut tree, &record, ApplyOptions::restore());
        }
        session
    }

    pub fn store(&self) -> &DraftStore {
        &self.store
    }

    // ------------------------------------------
    // 構造操作（境界操作）
    // ------------------------------------------

    pub async fn add_equipment_type(&self) -> String {
        let id = self.tree.lock().await.add_type(true);
        self.schedule_autosave();
        id
    }

    pub async fn delete_type(&self, type_id: &str) -> bool {
        let removed = self.tree.lock().await.delete_type(type_id);
        if removed {
            self.schedule_autosave();
        }
        removed
    }

    pub async fn add_instance(&self, type_id: &str) -> Result<String> {
        let id = self
            .tree
            .lock()
            .await
            .add_instance(type_id, true)
            .ok_or_else(|| AuditError::NodeNotFound(type_id.to_string()))?;
        self.schedule_autosave();
        Ok(id)
    }

    pub async fn delete_instance(&self, instance_id: &str) -> bool {
        let removed = self.tree.lock().await.delete_instance(instance_id);
        if removed {
            self.schedule_autosave();
        }
        removed
    }

    pub async fn add_input(&self, instance_id: &str) -> Result<String> {
        let id = self
            .tree
            .lock()
            .await
            .add_input(instance_id)
            .ok_or_else(|| AuditError::NodeNotFound(instance_id.to_string()))?;
        self.schedule_autosave();
        Ok(id)
    }

    pub async fn delete_input(&self, row_id: &str) -> bool {
        let removed = self.tree.lock().await.delete_input(row_id);
        if removed {
            self.schedule_autosave();
        }
        removed
    }

    pub async fn add_photo_slot(&self, instance_id: &str) -> Result<String> {
        let id = self
            .tree
            .lock()
            .await
            .add_photo_slot(instance_id)
            .ok_or_else(|| AuditError::NodeNotFound(instance_id.to_string()))?;
        self.schedule_autosave();
        Ok(id)
    }

    pub async fn delete_photo_slot(&self, slot_id: &str) -> bool {
        let removed = self.tree.lock().await.delete_photo_slot(slot_id);
        if removed {
            self.schedule_autosave();
        }
        removed
    }

    // ------------------------------------------
    // 値の編集
    // ------------------------------------------

    pub async fn set_basic_field(&self, key: &str, value: &str) -> bool {
        let updated = self.tree.lock().await.set_basic_field(key, value);
        if updated {
            self.touch(&format!("basic-{}", key)).await;
        }
        updated
    }

    pub async fn set_type_name(&self, type_id: &str, name: &str) -> bool {
        let updated = self.tree.lock().await.set_type_name(type_id, name);
        if updated {
            self.touch(&format!("{}-name", type_id)).await;
        }
        updated
    }

    pub async fn set_description(&self, instance_id: &str, value: &str) -> bool {
        let updated = self.tree.lock().await.set_description(instance_id, value);
        if updated {
            self.touch(&format!("{}-desc", instance_id)).await;
        }
        updated
    }

    pub async fn set_operating_hours(&self, instance_id: &str, value: &str) -> bool {
        let updated = self.tree.lock().await.set_operating_hours(instance_id, value);
        if updated {
            self.touch(&format!("{}-hours", instance_id)).await;
        }
        updated
    }

    pub async fn set_input_value(&self, row_id: &str, value: &str) -> bool {
        let updated = self.tree.lock().await.set_input_value(row_id, value);
        if updated {
            self.touch(row_id).await;
        }
        updated
    }

    /// 写真ファイルを取り込んでスロットへ格納する。
    /// デコードは別スレッドで行われ、完了までの間もほかの編集は進められる。
    /// デコード完了前にスロットが削除されていた場合は何も書かずOk(false)
    pub async fn capture_photo(&self, slot_id: &str, path: &Path) -> Result<bool> {
        let bytes = tokio::fs::read(path).await?;
        let payload = tokio::task::spawn_blocking(move || PhotoPayload::from_bytes(&bytes))
            .await
            .map_err(|e| AuditError::ImageDecode(e.to_string()))??;

        let written = self.tree.lock().await.set_photo(slot_id, payload);
        if written {
            self.touch(slot_id).await;
        }
        Ok(written)
    }

    pub async fn remove_photo(&self, slot_id: &str) -> bool {
        let cleared = self.tree.lock().await.clear_photo(slot_id);
        if cleared {
            self.touch(slot_id).await;
        }
        cleared
    }

    // ------------------------------------------
    // 保存・復元・エクスポート
    // ------------------------------------------

    /// 現在のフォーム状態のスナップショットを返す
    pub async fn snapshot(&self) -> AuditRecord {
        extract_state(&*self.tree.lock().await)
    }

    /// スナップショットをフォームへ反映し、保存を予約する
    pub async fn apply(&self, record: &AuditRecord, options: ApplyOptions) {
        let mut tree = self.tree.lock().await;
        apply_state(&mut tree, record, options);
        drop(tree);
        self.schedule_autosave();
    }

    /// 終了時などの即時保存。内容が空なら書き込まない
    pub async fn save_now(&self) -> Result<bool> {
        self.autosave.cancel();
        let record = extract_state(&*self.tree.lock().await);
        if !record.has_content() {
            return Ok(false);
        }
        self.store.save(&record)
    }

    /// ドラフトを破棄する。クリアフラグで後続の自動保存を抑止してから
    /// ストアのエントリとフォーム内容を消す
    pub async fn clear_draft(&self) -> Result<()> {
        self.store.clear()?;
        self.autosave.cancel();
        {
            let mut tree = self.tree.lock().await;
            *tree = FormTree::new();
        }
        self.store.end_clear();
        Ok(())
    }

    /// 診断書PDFを出力する。状態はエクスポート開始時点で同期的に確定し、
    /// 以後の編集はこの出力に影響しない
    pub async fn export_document(&self, output_dir: &Path) -> Result<PathBuf> {
        let record = extract_state(&*self.tree.lock().await);
        export::export_document(&record, output_dir)
    }

    fn schedule_autosave(&self) {
        let tree = Arc::clone(&self.tree);
        let store = Arc::clone(&self.store);
        self.autosave.schedule(async move {
            let record = extract_state(&*tree.lock().await);
            // 空のスナップショットで過去の保存を潰さない
            if !record.has_content() {
                return;
            }
            if let Err(e) = store.save(&record) {
                eprintln!("自動保存に失敗しました: {}", e);
            }
        });
    }

    /// 購読されたフィールドの編集1回につき、購読数ぶん保存を予約する。
    /// rebindが正しければ購読数は常に1で、二重発火は起きない
    async fn touch(&self, binding_id: &str) {
        let fires = self.tree.lock().await.binding_count(binding_id);
        for _ in 0..fires {
            self.schedule_autosave();
        }
    }
}
