//! 診断ドラフトの型定義
//!
//! フォームと保存スナップショットで共有される型:
//! - BasicInfo: 事業所の基本情報（固定10項目）
//! - EquipmentType / EquipmentInstance: 設備インベントリの階層
//! - AuditRecord: ドラフト全体（保存スナップショットの形そのもの）

use crate::photo::PhotoPayload;
use serde::{Deserialize, Serialize};

/// 事業所の基本情報
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BasicInfo {
    pub company_name: String,
    pub address: String,
    pub date: String,
    pub products: String,
    pub volume: String,           // 年間生産量（自由記述）
    pub shift_count: String,
    pub employee_count: String,
    pub raw_materials: String,
    pub plant_area: String,
    pub process_description: String,
}

impl BasicInfo {
    /// フィールドキー（JSON表記）の定義順
    pub const FIELD_KEYS: &'static [&'static str] = &[
        "companyName",
        "address",
        "date",
        "products",
        "volume",
        "shiftCount",
        "employeeCount",
        "rawMaterials",
        "plantArea",
        "processDescription",
    ];

    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            "companyName" => &self.company_name,
            "address" => &self.address,
            "date" => &self.date,
            "products" => &self.products,
            "volume" => &self.volume,
            "shiftCount" => &self.shift_count,
            "employeeCount" => &self.employee_count,
            "rawMaterials" => &self.raw_materials,
            "plantArea" => &self.plant_area,
            "processDescription" => &self.process_description,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// キー指定で値を設定。未知のキーはfalse（エラーにしない）
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        let slot = match key {
            "companyName" => &mut self.company_name,
            "address" => &mut self.address,
            "date" => &mut self.date,
            "products" => &mut self.products,
            "volume" => &mut self.volume,
            "shiftCount" => &mut self.shift_count,
            "employeeCount" => &mut self.employee_count,
            "rawMaterials" => &mut self.raw_materials,
            "plantArea" => &mut self.plant_area,
            "processDescription" => &mut self.process_description,
            _ => return false,
        };
        *slot = value.to_string();
        true
    }

    /// いずれかの項目に空白以外の入力があるか
    pub fn any_filled(&self) -> bool {
        Self::FIELD_KEYS
            .iter()
            .filter_map(|k| self.get(k))
            .any(|v| !v.trim().is_empty())
    }
}

/// 設備インスタンス（1台分）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EquipmentInstance {
    pub description: String,
    /// 稼働時間（自由記述。数値とは限らない）
    pub operating_hours: String,
    pub energy_inputs: Vec<String>,
    pub photos: Vec<PhotoPayload>,
}

/// 設備種別（種別名 + インスタンス列）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EquipmentType {
    pub name: String,
    pub instances: Vec<EquipmentInstance>,
}

/// ドラフト全体。保存キー `energy-audit-draft` のスナップショットと同形
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuditRecord {
    pub basic_info: BasicInfo,
    pub plant_layout_photo: Option<PhotoPayload>,
    pub process_photo: Option<PhotoPayload>,
    pub equipment_types: Vec<EquipmentType>,
}

impl AuditRecord {
    /// 保存に値する内容があるか。
    /// 空のスナップショットで既存の保存を潰さないための判定
    pub fn has_content(&self) -> bool {
        self.basic_info.any_filled()
            || self.plant_layout_photo.is_some()
            || self.process_photo.is_some()
            || !self.equipment_types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_record_default() {
        let record = AuditRecord::default();
        assert_eq!(record.basic_info.company_name, "");
        assert!(record.plant_layout_photo.is_none());
        assert!(record.equipment_types.is_empty());
        assert!(!record.has_content());
    }

    #[test]
    fn test_audit_record_serialize() {
        let record = AuditRecord {
            basic_info: BasicInfo {
                company_name: "Acme Co".to_string(),
                shift_count: "2".to_string(),
                ..Default::default()
            },
            equipment_types: vec![EquipmentType {
                name: "Boiler".to_string(),
                instances: vec![EquipmentInstance {
                    description: "Main boiler".to_string(),
                    operating_hours: "8".to_string(),
                    energy_inputs: vec!["Electricity (kWh)".to_string()],
                    photos: vec![],
                }],
            }],
            ..Default::default()
        };

        let json = serde_json::to_string(&record).expect("シリアライズ失敗");
        assert!(json.contains("\"companyName\":\"Acme Co\""));
        assert!(json.contains("\"shiftCount\":\"2\""));
        assert!(json.contains("\"operatingHours\":\"8\""));
        assert!(json.contains("\"energyInputs\":[\"Electricity (kWh)\"]"));
    }

    #[test]
    fn test_audit_record_deserialize_missing_fields() {
        // 欠損フィールドはデフォルト値で埋まる（保存形式の後方互換）
        let json = r#"{"basicInfo": {"companyName": "Acme Co"}}"#;

        let record: AuditRecord = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(record.basic_info.company_name, "Acme Co");
        assert_eq!(record.basic_info.address, "");
        assert!(record.process_photo.is_none());
        assert!(record.equipment_types.is_empty());
    }

    #[test]
    fn test_audit_record_roundtrip() {
        let original = AuditRecord {
            basic_info: BasicInfo {
                company_name: "Acme Co".to_string(),
                address: "1-2-3 Industrial Park".to_string(),
                date: "2026-08-04".to_string(),
                process_description: "casting -> machining -> assembly".to_string(),
                ..Default::default()
            },
            equipment_types: vec![
                EquipmentType {
                    name: "Boiler".to_string(),
                    instances: vec![EquipmentInstance {
                        description: "Main boiler".to_string(),
                        operating_hours: "8".to_string(),
                        energy_inputs: vec!["Electricity (kWh)".to_string(), "LPG (kg)".to_string()],
                        photos: vec![],
                    }],
                },
                EquipmentType {
                    name: "Compressor".to_string(),
                    instances: vec![],
                },
            ],
            ..Default::default()
        };

        let json = serde_json::to_string(&original).expect("シリアライズ失敗");
        let restored: AuditRecord = serde_json::from_str(&json).expect("デシリアライズ失敗");

        assert_eq!(original, restored);
        // 種別の作成順は保存で変わらない
        assert_eq!(restored.equipment_types[0].name, "Boiler");
        assert_eq!(restored.equipment_types[1].name, "Compressor");
    }

    #[test]
    fn test_basic_info_set_get() {
        let mut info = BasicInfo::default();
        assert!(info.set("companyName", "Acme Co"));
        assert!(info.set("plantArea", "3200 m2"));
        assert!(!info.set("unknownField", "x"));

        assert_eq!(info.get("companyName"), Some("Acme Co"));
        assert_eq!(info.get("plantArea"), Some("3200 m2"));
        assert_eq!(info.get("unknownField"), None);
    }

    #[test]
    fn test_has_content_detection() {
        let mut record = AuditRecord::default();
        assert!(!record.has_content());

        // 空白のみの入力は内容と見なさない
        record.basic_info.address = "   ".to_string();
        assert!(!record.has_content());

        record.basic_info.address = "somewhere".to_string();
        assert!(record.has_content());

        let mut record = AuditRecord::default();
        record.equipment_types.push(EquipmentType::default());
        assert!(record.has_content());
    }
}
