//! フォーム状態シリアライザ
//!
//! 構造木 ⇄ AuditRecord の変換。抽出時に空白の入力行と
//! 「名前なし・インスタンスなし」の種別を落とす。

use crate::form::tree::FormTree;
use crate::record::{AuditRecord, EquipmentInstance, EquipmentType};

/// applyState時の挙動制御
#[derive(Debug, Clone, Copy)]
pub struct ApplyOptions {
    /// 子を持たない種別/インスタンスに空の既定子要素を補うか。
    /// 通常の追加フローではtrue、保存からの復元では「保存された
    /// 子要素だけ」を正確に再現するためfalse
    pub seed_defaults: bool,
}

impl ApplyOptions {
    /// 追加フロー向け（既定子要素を補う）
    pub fn interactive() -> Self {
        Self { seed_defaults: true }
    }

    /// 復元向け（保存内容をそのまま再現する）
    pub fn restore() -> Self {
        Self { seed_defaults: false }
    }
}

/// 現在の構造木からスナップショットを抽出する。
/// 存在しない任意項目は空として扱い、失敗しない
pub fn extract_state(tree: &FormTree) -> AuditRecord {
    let mut equipment_types = Vec::new();
    for section in &tree.sections {
        // 名前が空白のみでインスタンスも無い種別は出力しない
        if section.name.trim().is_empty() && section.instances.is_empty() {
            continue;
        }
        equipment_types.push(EquipmentType {
            name: section.name.clone(),
            instances: section
                .instances
                .iter()
                .map(|instance| EquipmentInstance {
                    description: instance.description.clone(),
                    operating_hours: instance.operating_hours.clone(),
                    energy_inputs: instance
                        .inputs
                        .iter()
                        .map(|row| row.value.clone())
                        .filter(|value| !value.trim().is_empty())
                        .collect(),
                    photos: instance
                        .photos
                        .iter()
                        .filter_map(|slot| slot.payload.clone())
                        .collect(),
                })
                .collect(),
        });
    }

    AuditRecord {
        basic_info: tree.basic.clone(),
        plant_layout_photo: tree.plant_layout.clone(),
        process_photo: tree.process_photo.clone(),
        equipment_types,
    }
}

/// スナップショットに合わせて構造木を作り直す
pub fn apply_state(tree: &mut FormTree, record: &AuditRecord, options: ApplyOptions) {
    tree.basic = record.basic_info.clone();
    tree.plant_layout = record.plant_layout_photo.clone();
    tree.process_photo = record.process_photo.clone();
    tree.reset_sections();

    for equipment_type in &record.equipment_types {
        let type_id = tree.add_type(false);
        tree.set_type_name(&type_id, &equipment_type.name);

        for instance in &equipment_type.instances {
            let instance_id = match tree.add_instance(&type_id, false) {
                Some(id) => id,
                None => continue,
            };
            tree.set_description(&instance_id, &instance.description);
            tree.set_operating_hours(&instance_id, &instance.operating_hours);

            for value in &instance.energy_inputs {
                if let Some(row_id) = tree.add_input(&instance_id) {
                    tree.set_input_value(&row_id, value);
                }
            }
            for photo in &instance.photos {
                if let Some(slot_id) = tree.add_photo_slot(&instance_id) {
                    tree.set_photo(&slot_id, photo.clone());
                }
            }

            if options.seed_defaults {
                if tree_instance_is_childless(tree, &instance_id, Kind::Input) {
                    let _ = tree.add_input(&instance_id);
                }
                if tree_instance_is_childless(tree, &instance_id, Kind::Photo) {
                    let _ = tree.add_photo_slot(&instance_id);
                }
            }
        }

        if options.seed_defaults && type_is_childless(tree, &type_id) {
            let _ = tree.add_instance(&type_id, true);
        }
    }
}

enum Kind {
    Input,
    Photo,
}

fn type_is_childless(tree: &FormTree, type_id: &str) -> bool {
    tree.sections
        .iter()
        .find(|s| s.id == type_id)
        .map(|s| s.instances.is_empty())
        .unwrap_or(false)
}

fn tree_instance_is_childless(tree: &FormTree, instance_id: &str, kind: Kind) -> bool {
    tree.sections
        .iter()
        .flat_map(|s| s.instances.iter())
        .find(|i| i.id == instance_id)
        .map(|i| match kind {
            Kind::Input => i.inputs.is_empty(),
            Kind::Photo => i.photos.is_empty(),
        })
        .unwrap_or(false)
}
