use clap::Parser;
use dialoguer::Confirm;
use energy_audit_rust::cli::{Cli, Commands};
use energy_audit_rust::error::{AuditError, Result};
use energy_audit_rust::record::{AuditRecord, BasicInfo};
use energy_audit_rust::session::AuditSession;
use energy_audit_rust::store::DraftStore;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let store = match cli.store_dir {
        Some(dir) => DraftStore::open(dir),
        None => DraftStore::open_default()?,
    };

    match cli.command {
        Commands::Show => {
            println!("📋 energy-audit - ドラフト概要\n");

            match store.load() {
                None => println!("保存されたドラフトはありません"),
                Some(record) => print_summary(&record),
            }
        }

        Commands::Import { input } => {
            println!("📥 energy-audit - スナップショット取り込み\n");

            println!("[1/2] スナップショットを読み込み中...");
            let content = std::fs::read_to_string(&input)?;
            let record: AuditRecord = serde_json::from_str(&content)?;
            println!(
                "✔ 基本情報と設備種別{}件を読み込み\n",
                record.equipment_types.len()
            );

            println!("[2/2] ドラフトへ保存中...");
            if !record.has_content() {
                println!("内容が空のため保存しませんでした");
                return Ok(());
            }
            store.save(&record)?;
            println!("✔ 保存完了: {}", store.entry_path().display());

            println!("\n✅ 取り込み完了");
        }

        Commands::Export { output } => {
            println!("📄 energy-audit - 診断書エクスポート\n");

            println!("[1/2] ドラフトを復元中...");
            let session = AuditSession::open(store).await;
            let snapshot = session.snapshot().await;
            if !snapshot.has_content() {
                println!("保存されたドラフトがありません。エクスポートを中止します");
                return Ok(());
            }
            println!("✔ 設備種別{}件を復元\n", snapshot.equipment_types.len());

            println!("[2/2] PDFを生成中...");
            let output_dir = output.unwrap_or_else(|| std::path::PathBuf::from("."));
            match session.export_document(&output_dir).await {
                Ok(path) => {
                    println!("✔ 診断書を出力: {}", path.display());
                    println!("\n✅ エクスポート完了");
                }
                Err(AuditError::ExportUnavailable) => {
                    println!("PDF出力機能が利用できないため、エクスポートをスキップしました");
                }
                Err(e) => return Err(e),
            }
        }

        Commands::Clear { yes } => {
            println!("🗑  energy-audit - ドラフト破棄\n");

            if !store.exists() {
                println!("保存されたドラフトはありません");
                return Ok(());
            }

            let confirmed = yes
                || Confirm::new()
                    .with_prompt("保存中のドラフトを完全に削除します。よろしいですか?")
                    .default(false)
                    .interact()
                    .unwrap_or(false);
            if !confirmed {
                println!("中止しました");
                return Ok(());
            }

            let session = AuditSession::open(store).await;
            session.clear_draft().await?;
            println!("✔ ドラフトを削除しました");
        }
    }

    Ok(())
}

fn print_summary(record: &AuditRecord) {
    let company = record.basic_info.company_name.trim();
    println!(
        "会社名: {}",
        if company.is_empty() { "(未入力)" } else { company }
    );

    let filled = BasicInfo::FIELD_KEYS
        .iter()
        .filter_map(|k| record.basic_info.get(k))
        .filter(|v| !v.trim().is_empty())
        .count();
    println!("基本情報: {}/{}項目入力済み", filled, BasicInfo::FIELD_KEYS.len());
    println!(
        "工場レイアウト写真: {}",
        if record.plant_layout_photo.is_some() { "あり" } else { "なし" }
    );
    println!(
        "生産工程写真: {}",
        if record.process_photo.is_some() { "あり" } else { "なし" }
    );

    println!("設備種別: {}件", record.equipment_types.len());
    for (index, equipment_type) in record.equipment_types.iter().enumerate() {
        let name = equipment_type.name.trim();
        let name = if name.is_empty() { "(名称未入力)" } else { name };
        let photo_count: usize = equipment_type
            .instances
            .iter()
            .map(|i| i.photos.len())
            .sum();
        println!(
            "  {}. {} - インスタンス{}件 / 写真{}枚",
            index + 1,
            name,
            equipment_type.instances.len(),
            photo_count
        );
    }
}
