//! フォーム状態エンジン
//!
//! tree: 動的構造の組み立て・破棄とID管理
//! serializer: 構造木 ⇄ スナップショットの変換

pub mod serializer;
pub mod tree;

pub use serializer::{apply_state, extract_state, ApplyOptions};
pub use tree::{FormTree, PLANT_LAYOUT_SLOT, PROCESS_SLOT};
