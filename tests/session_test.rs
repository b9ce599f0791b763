//! 監査セッションの統合テスト
//!
//! 編集 → デバウンス → 自動保存の経路と、復元・クリア・写真取り込みを
//! 実ストア（一時ディレクトリ）込みで検証

use energy_audit_rust::form::ApplyOptions;
use energy_audit_rust::record::{AuditRecord, EquipmentInstance, EquipmentType};
use energy_audit_rust::session::AuditSession;
use energy_audit_rust::store::DraftStore;
use std::io::Cursor;
use std::time::Duration;
use tempfile::tempdir;

/// テスト用のPNGファイルを作る
fn write_png(path: &std::path::Path, width: u32, height: u32) {
    let img = image::RgbImage::new(width, height);
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageOutputFormat::Png)
        .expect("PNGエンコード失敗");
    std::fs::write(path, buf).expect("PNG書き込み失敗");
}

/// スケジュール済みタスクを確実に走らせる
async fn drain() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

/// 連続編集は静止期間後の1回の保存にまとまる
#[tokio::test(start_paused = true)]
async fn test_rapid_edits_autosave_once_after_quiet_window() {
    let dir = tempdir().expect("Failed to create temp dir");
    let session = AuditSession::new(DraftStore::open(dir.path()));

    // キー入力1回ごとのイベントを模す
    for chunk in ["A", "Ac", "Acm", "Acme", "Acme Co"] {
        assert!(session.set_basic_field("companyName", chunk).await);
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    // 最後の編集から静止期間が明ける前は未保存
    tokio::time::sleep(Duration::from_millis(500)).await;
    drain().await;
    assert!(!session.store().exists(), "静止期間前に保存された");

    tokio::time::sleep(Duration::from_millis(400)).await;
    drain().await;

    let saved = session.store().load().expect("自動保存が走っていない");
    assert_eq!(saved.basic_info.company_name, "Acme Co");
}

/// 内容が空のままでは自動保存は書き込まない
#[tokio::test(start_paused = true)]
async fn test_empty_form_is_never_persisted() {
    let dir = tempdir().expect("Failed to create temp dir");
    let session = AuditSession::new(DraftStore::open(dir.path()));

    // 空白のみの編集イベント
    assert!(session.set_basic_field("companyName", "   ").await);
    tokio::time::sleep(Duration::from_millis(1000)).await;
    drain().await;

    assert!(!session.store().exists(), "空のスナップショットが保存された");
    assert!(!session.save_now().await.expect("保存呼び出し失敗"));
}

/// クリアは保留中の自動保存ごとドラフトを破棄する
#[tokio::test(start_paused = true)]
async fn test_clear_draft_discards_pending_autosave() {
    let dir = tempdir().expect("Failed to create temp dir");
    let session = AuditSession::new(DraftStore::open(dir.path()));

    session.set_basic_field("companyName", "Acme Co").await;
    tokio::time::sleep(Duration::from_millis(1000)).await;
    drain().await;
    assert!(session.store().exists());

    // クリア直前の編集で自動保存が予約されている状態
    session.set_basic_field("address", "somewhere").await;
    session.clear_draft().await.expect("クリア失敗");

    tokio::time::sleep(Duration::from_millis(1000)).await;
    drain().await;

    // 予約されていた保存でクリアが巻き戻っていない
    assert!(!session.store().exists(), "クリア後に自動保存が復活した");
    assert!(!session.snapshot().await.has_content());
}

/// 復元は保存された子要素だけを正確に再現する
#[tokio::test]
async fn test_open_restores_exact_children() {
    let dir = tempdir().expect("Failed to create temp dir");

    let record = AuditRecord {
        equipment_types: vec![
            EquipmentType {
                name: "Boiler".to_string(),
                instances: vec![EquipmentInstance {
                    description: "Main boiler".to_string(),
                    operating_hours: "8".to_string(),
                    energy_inputs: vec!["Electricity (kWh)".to_string()],
                    photos: vec![],
                }],
            },
            // インスタンスゼロの種別。復元で空インスタンスを補ってはいけない
            EquipmentType {
                name: "Chiller".to_string(),
                instances: vec![],
            },
        ],
        ..Default::default()
    };

    {
        let store = DraftStore::open(dir.path());
        store.save(&record).expect("保存失敗");
    }

    let session = AuditSession::open(DraftStore::open(dir.path())).await;
    let restored = session.snapshot().await;
    assert_eq!(restored, record);
    assert!(restored.equipment_types[1].instances.is_empty());
}

/// 境界操作での組み立て → 抽出の代表シナリオ
#[tokio::test(start_paused = true)]
async fn test_acme_scenario_via_boundary_operations() {
    let dir = tempdir().expect("Failed to create temp dir");
    let session = AuditSession::new(DraftStore::open(dir.path()));

    session.set_basic_field("companyName", "Acme Co").await;
    let type_id = session.add_equipment_type().await;
    session.set_type_name(&type_id, "Boiler").await;

    // add_equipment_typeは空インスタンス1件（空行・空スロット込み）を補う。
    // インスタンスIDは親ID + 連番
    let inst_id = format!("{}-inst-1", type_id);
    session.set_description(&inst_id, "Main boiler").await;
    session.set_operating_hours(&inst_id, "8").await;
    let row_id = session.add_input(&inst_id).await.expect("行追加失敗");
    session.set_input_value(&row_id, "Electricity (kWh)").await;

    let record = session.snapshot().await;
    assert_eq!(record.basic_info.company_name, "Acme Co");
    assert_eq!(record.equipment_types.len(), 1);
    let instance = &record.equipment_types[0].instances[0];
    assert_eq!(instance.description, "Main boiler");
    // 既定の空行は抽出で落ち、値入りの行だけ残る
    assert_eq!(instance.energy_inputs, vec!["Electricity (kWh)".to_string()]);

    tokio::time::sleep(Duration::from_millis(1000)).await;
    drain().await;
    let saved = session.store().load().expect("自動保存が走っていない");
    assert_eq!(saved, record);
}

/// 写真取り込み: デコード完了時にスロットが消えていれば何も書かない
#[tokio::test]
async fn test_capture_into_deleted_slot_is_noop() {
    let dir = tempdir().expect("Failed to create temp dir");
    let png_path = dir.path().join("photo.png");
    write_png(&png_path, 8, 6);

    let session = AuditSession::new(DraftStore::open(dir.path()));
    let type_id = session.add_equipment_type().await;
    let inst_id = session.add_instance(&type_id).await.expect("追加失敗");
    let slot_id = session.add_photo_slot(&inst_id).await.expect("スロット追加失敗");

    assert!(session.delete_photo_slot(&slot_id).await);

    let written = session
        .capture_photo(&slot_id, &png_path)
        .await
        .expect("取り込み失敗");
    assert!(!written, "削除済みスロットへ書き込まれた");

    let record = session.snapshot().await;
    let photos: usize = record
        .equipment_types
        .iter()
        .flat_map(|t| t.instances.iter())
        .map(|i| i.photos.len())
        .sum();
    assert_eq!(photos, 0);
}

/// 写真取り込み成功でペイロードが格納される
#[tokio::test]
async fn test_capture_photo_fills_slot() {
    let dir = tempdir().expect("Failed to create temp dir");
    let png_path = dir.path().join("photo.png");
    write_png(&png_path, 8, 6);

    let session = AuditSession::new(DraftStore::open(dir.path()));
    let type_id = session.add_equipment_type().await;
    let inst_id = session.add_instance(&type_id).await.expect("追加失敗");
    let slot_id = session.add_photo_slot(&inst_id).await.expect("スロット追加失敗");

    let written = session
        .capture_photo(&slot_id, &png_path)
        .await
        .expect("取り込み失敗");
    assert!(written);

    let record = session.snapshot().await;
    let photo = &record.equipment_types[0].instances[0].photos[0];
    assert_eq!(photo.dimensions().expect("寸法取得失敗"), (8, 6));
}

/// 画像でないファイルの取り込みは失敗し、スロットは空のまま
#[tokio::test]
async fn test_capture_rejects_non_image_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let bogus_path = dir.path().join("not_an_image.txt");
    std::fs::write(&bogus_path, "plain text").unwrap();

    let session = AuditSession::new(DraftStore::open(dir.path()));
    let type_id = session.add_equipment_type().await;
    let inst_id = session.add_instance(&type_id).await.expect("追加失敗");
    let slot_id = session.add_photo_slot(&inst_id).await.expect("スロット追加失敗");

    assert!(session.capture_photo(&slot_id, &bogus_path).await.is_err());

    // 失敗後も再試行できる（スロットは残っている）
    let record = session.snapshot().await;
    assert!(record.equipment_types[0].instances[0].photos.is_empty());
}

/// 存在しない親を指す操作はNodeNotFound
#[tokio::test]
async fn test_missing_parent_fails() {
    let dir = tempdir().expect("Failed to create temp dir");
    let session = AuditSession::new(DraftStore::open(dir.path()));

    assert!(session.add_instance("equip-99").await.is_err());
    assert!(session.add_input("equip-1-inst-99").await.is_err());

    // 削除は冪等でfalseを返すだけ
    assert!(!session.delete_type("equip-99").await);
}

/// applyでスナップショットを反映できる（取り込みフロー）
#[tokio::test(start_paused = true)]
async fn test_apply_schedules_autosave() {
    let dir = tempdir().expect("Failed to create temp dir");
    let session = AuditSession::new(DraftStore::open(dir.path()));

    let record = AuditRecord {
        equipment_types: vec![EquipmentType {
            name: "Compressor".to_string(),
            instances: vec![],
        }],
        ..Default::default()
    };
    session.apply(&record, ApplyOptions::restore()).await;

    tokio::time::sleep(Duration::from_millis(1000)).await;
    drain().await;
    let saved = session.store().load().expect("自動保存が走っていない");
    assert_eq!(saved.equipment_types[0].name, "Compressor");
}
