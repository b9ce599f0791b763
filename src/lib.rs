//! 省エネ診断ドラフトエンジン
//!
//! 階層フォーム状態の自動保存と診断書PDF出力のコア:
//! - form: 動的構造の組み立てとスナップショット変換
//! - scheduler: 編集イベントをまとめるデバウンサ
//! - store: 容量制限付きの単一キー永続化
//! - export: ページ組みPDFレンダラ
//! - session: 境界操作を束ねるファサード

pub mod cli;
pub mod error;
pub mod export;
pub mod form;
pub mod photo;
pub mod record;
pub mod scheduler;
pub mod session;
pub mod store;

pub use error::{AuditError, Result};
pub use form::{apply_state, extract_state, ApplyOptions, FormTree};
pub use photo::PhotoPayload;
pub use record::{AuditRecord, BasicInfo, EquipmentInstance, EquipmentType};
pub use session::AuditSession;
pub use store::DraftStore;
