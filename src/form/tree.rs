//! 動的フォーム構造
//!
//! 設備種別 → インスタンス → エネルギー入力行 / 写真スロット の
//! 入れ子構造を組み立て・破棄する。各ノードは作成順から導出した
//! 安定IDを持ち、削除や購読の付け替えはIDで行う。
//! IDは削除後も振り直さない（連番の欠けは許容し、シリアライザは
//! 読み取り時点の木の形だけを見る）。

use crate::photo::PhotoPayload;
use crate::record::BasicInfo;
use std::time::{SystemTime, UNIX_EPOCH};

/// 工場レイアウト写真の固定スロットID
pub const PLANT_LAYOUT_SLOT: &str = "photo-plant-layout";
/// 生産工程写真の固定スロットID
pub const PROCESS_SLOT: &str = "photo-process";

/// エネルギー入力の1行
#[derive(Debug, Clone)]
pub struct InputRow {
    pub id: String,
    pub value: String,
}

/// 写真スロット。payloadが空のままのスロットは出力に含まれない
#[derive(Debug, Clone)]
pub struct PhotoSlot {
    pub id: String,
    pub payload: Option<PhotoPayload>,
}

/// 設備インスタンスのセクション
#[derive(Debug, Clone)]
pub struct InstanceSection {
    pub id: String,
    pub description: String,
    pub operating_hours: String,
    pub inputs: Vec<InputRow>,
    pub photos: Vec<PhotoSlot>,
}

/// 設備種別のセクション
#[derive(Debug, Clone)]
pub struct TypeSection {
    pub id: String,
    pub name: String,
    pub instances: Vec<InstanceSection>,
    inst_seq: u64,
}

/// 行・スロットID用の時刻ベース採番。
/// 同一ミリ秒内の連続作成はカウンタで一意性を保つ
#[derive(Debug, Default)]
struct RowClock {
    last_ms: u128,
    tick: u32,
}

impl RowClock {
    fn next(&mut self, prefix: &str) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        if now == self.last_ms {
            self.tick += 1;
        } else {
            self.last_ms = now;
            self.tick = 0;
        }
        format!("{}-{}-{}", prefix, now, self.tick)
    }
}

/// フォーム全体の構造木
#[derive(Debug)]
pub struct FormTree {
    pub basic: BasicInfo,
    pub plant_layout: Option<PhotoPayload>,
    pub process_photo: Option<PhotoPayload>,
    pub sections: Vec<TypeSection>,
    type_seq: u64,
    clock: RowClock,
    bindings: Vec<String>,
}

impl Default for FormTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FormTree {
    pub fn new() -> Self {
        let mut tree = Self {
            basic: BasicInfo::default(),
            plant_layout: None,
            process_photo: None,
            sections: Vec::new(),
            type_seq: 0,
            clock: RowClock::default(),
            bindings: Vec::new(),
        };
        tree.rebind();
        tree
    }

    // ------------------------------------------
    // 構造操作
    // ------------------------------------------

    /// 設備種別を追加。seed時は空インスタンス1件込みで作る
    pub fn add_type(&mut self, seed: bool) -> String {
        self.type_seq += 1;
        let id = format!("equip-{}", self.type_seq);
        let mut section = TypeSection {
            id: id.clone(),
            name: String::new(),
            instances: Vec::new(),
            inst_seq: 0,
        };
        if seed {
            Self::push_instance(&mut section, &mut self.clock, true);
        }
        self.sections.push(section);
        self.rebind();
        id
    }

    /// 種別とその配下をまとめて削除。兄弟のIDは振り直さない
    pub fn delete_type(&mut self, type_id: &str) -> bool {
        let before = self.sections.len();
        self.sections.retain(|s| s.id != type_id);
        let removed = self.sections.len() != before;
        if removed {
            self.rebind();
        }
        removed
    }

    /// 指定種別へインスタンスを追加
    pub fn add_instance(&mut self, type_id: &str, seed: bool) -> Option<String> {
        let clock = &mut self.clock;
        let section = self.sections.iter_mut().find(|s| s.id == type_id)?;
        let id = Self::push_instance(section, clock, seed);
        self.rebind();
        Some(id)
    }

    fn push_instance(section: &mut TypeSection, clock: &mut RowClock, seed: bool) -> String {
        section.inst_seq += 1;
        let id = format!("{}-inst-{}", section.id, section.inst_seq);
        let mut instance = InstanceSection {
            id: id.clone(),
            description: String::new(),
            operating_hours: String::new(),
            inputs: Vec::new(),
            photos: Vec::new(),
        };
        if seed {
            instance.inputs.push(InputRow {
                id: clock.next("row"),
                value: String::new(),
            });
            instance.photos.push(PhotoSlot {
                id: clock.next("photo"),
                payload: None,
            });
        }
        section.instances.push(instance);
        id
    }

    pub fn delete_instance(&mut self, instance_id: &str) -> bool {
        let mut removed = false;
        for section in &mut self.sections {
            let before = section.instances.len();
            section.instances.retain(|i| i.id != instance_id);
            removed |= section.instances.len() != before;
        }
        if removed {
            self.rebind();
        }
        removed
    }

    pub fn add_input(&mut self, instance_id: &str) -> Option<String> {
        let id = self.clock.next("row");
        let instance = self.instance_mut(instance_id)?;
        instance.inputs.push(InputRow {
            id: id.clone(),
            value: String::new(),
        });
        self.rebind();
        Some(id)
    }

    pub fn delete_input(&mut self, row_id: &str) -> bool {
        let mut removed = false;
        for section in &mut self.sections {
            for instance in &mut section.instances {
                let before = instance.inputs.len();
                instance.inputs.retain(|r| r.id != row_id);
                removed |= instance.inputs.len() != before;
            }
        }
        if removed {
            self.rebind();
        }
        removed
    }

    pub fn add_photo_slot(&mut self, instance_id: &str) -> Option<String> {
        let id = self.clock.next("photo");
        let instance = self.instance_mut(instance_id)?;
        instance.photos.push(PhotoSlot {
            id: id.clone(),
            payload: None,
        });
        self.rebind();
        Some(id)
    }

    pub fn delete_photo_slot(&mut self, slot_id: &str) -> bool {
        let mut removed = false;
        for section in &mut self.sections {
            for instance in &mut section.instances {
                let before = instance.photos.len();
                instance.photos.retain(|p| p.id != slot_id);
                removed |= instance.photos.len() != before;
            }
        }
        if removed {
            self.rebind();
        }
        removed
    }

    /// 全セクションを破棄して空のフォームに戻す
    pub fn reset_sections(&mut self) {
        self.sections.clear();
        self.rebind();
    }

    // ------------------------------------------
    // 値の編集
    // ------------------------------------------

    pub fn set_basic_field(&mut self, key: &str, value: &str) -> bool {
        self.basic.set(key, value)
    }

    pub fn set_type_name(&mut self, type_id: &str, name: &str) -> bool {
        match self.sections.iter_mut().find(|s| s.id == type_id) {
            Some(section) => {
                section.name = name.to_string();
                true
            }
            None => false,
        }
    }

    pub fn set_description(&mut self, instance_id: &str, value: &str) -> bool {
        match self.instance_mut(instance_id) {
            Some(instance) => {
                instance.description = value.to_string();
                true
            }
            None => false,
        }
    }

    pub fn set_operating_hours(&mut self, instance_id: &str, value: &str) -> bool {
        match self.instance_mut(instance_id) {
            Some(instance) => {
                instance.operating_hours = value.to_string();
                true
            }
            None => false,
        }
    }

    pub fn set_input_value(&mut self, row_id: &str, value: &str) -> bool {
        for section in &mut self.sections {
            for instance in &mut section.instances {
                if let Some(row) = instance.inputs.iter_mut().find(|r| r.id == row_id) {
                    row.value = value.to_string();
                    return true;
                }
            }
        }
        false
    }

    /// 写真をスロットへ格納。固定スロットも受け付ける。
    /// スロットが既に削除されていればfalse（書き込みは行われない）
    pub fn set_photo(&mut self, slot_id: &str, payload: PhotoPayload) -> bool {
        match slot_id {
            PLANT_LAYOUT_SLOT => {
                self.plant_layout = Some(payload);
                true
            }
            PROCESS_SLOT => {
                self.process_photo = Some(payload);
                true
            }
            _ => {
                for section in &mut self.sections {
                    for instance in &mut section.instances {
                        if let Some(slot) = instance.photos.iter_mut().find(|p| p.id == slot_id) {
                            slot.payload = Some(payload);
                            return true;
                        }
                    }
                }
                false
            }
        }
    }

    pub fn clear_photo(&mut self, slot_id: &str) -> bool {
        match slot_id {
            PLANT_LAYOUT_SLOT => {
                self.plant_layout = None;
                true
            }
            PROCESS_SLOT => {
                self.process_photo = None;
                true
            }
            _ => {
                for section in &mut self.sections {
                    for instance in &mut section.instances {
                        if let Some(slot) = instance.photos.iter_mut().find(|p| p.id == slot_id) {
                            slot.payload = None;
                            return true;
                        }
                    }
                }
                false
            }
        }
    }

    fn instance_mut(&mut self, instance_id: &str) -> Option<&mut InstanceSection> {
        self.sections
            .iter_mut()
            .flat_map(|s| s.instances.iter_mut())
            .find(|i| i.id == instance_id)
    }

    pub fn has_photo_slot(&self, slot_id: &str) -> bool {
        if slot_id == PLANT_LAYOUT_SLOT || slot_id == PROCESS_SLOT {
            return true;
        }
        self.sections
            .iter()
            .flat_map(|s| s.instances.iter())
            .any(|i| i.photos.iter().any(|p| p.id == slot_id))
    }

    // ------------------------------------------
    // 購読（リスナー）管理
    // ------------------------------------------

    /// 1フィールドを購読。既存の購読を外してから付け直すので
    /// 何度呼んでも購読は常にちょうど1件
    fn bind(&mut self, id: String) {
        self.bindings.retain(|b| *b != id);
        self.bindings.push(id);
    }

    /// 構造変更後に全編集可能フィールドの購読を付け直す
    pub fn rebind(&mut self) {
        self.bindings.clear();
        for key in BasicInfo::FIELD_KEYS {
            self.bind(format!("basic-{}", key));
        }
        self.bind(PLANT_LAYOUT_SLOT.to_string());
        self.bind(PROCESS_SLOT.to_string());

        let ids: Vec<String> = self
            .sections
            .iter()
            .flat_map(|section| {
                let mut ids = vec![format!("{}-name", section.id)];
                for instance in &section.instances {
                    ids.push(format!("{}-desc", instance.id));
                    ids.push(format!("{}-hours", instance.id));
                    ids.extend(instance.inputs.iter().map(|r| r.id.clone()));
                    ids.extend(instance.photos.iter().map(|p| p.id.clone()));
                }
                ids
            })
            .collect();
        for id in ids {
            self.bind(id);
        }
    }

    /// 該当フィールドの購読数（編集1回あたりの発火回数）
    pub fn binding_count(&self, id: &str) -> usize {
        self.bindings.iter().filter(|b| b.as_str() == id).count()
    }
}
