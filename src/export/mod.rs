//! 診断書エクスポート
//!
//! PDFバックエンドは `pdf` フィーチャで切り替え可能。
//! 無効ビルドではエクスポート操作が ExportUnavailable を返すだけで、
//! 自動保存などの他機能には影響しない。

pub mod layout;
#[cfg(feature = "pdf")]
pub mod pdf;

use crate::error::Result;
use crate::record::AuditRecord;
use regex::Regex;
use std::path::{Path, PathBuf};

/// 会社名が未入力のときのファイル名プレースホルダ
pub const DEFAULT_COMPANY_NAME: &str = "Company";

/// 出力ファイル名: `{会社名(空白→_)}_Energy_Audit_{日付}.pdf`
pub fn document_file_name(record: &AuditRecord) -> String {
    lazy_static::lazy_static! {
        static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
    }

    let company = record.basic_info.company_name.trim();
    let company = if company.is_empty() {
        DEFAULT_COMPANY_NAME.to_string()
    } else {
        WHITESPACE_RE.replace_all(company, "_").into_owned()
    };

    let date = record.basic_info.date.trim();
    let date = if date.is_empty() {
        today_string()
    } else {
        date.to_string()
    };

    format!("{}_Energy_Audit_{}.pdf", company, date)
}

pub(crate) fn today_string() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// スナップショットを診断書PDFとして出力する
#[cfg(feature = "pdf")]
pub fn export_document(record: &AuditRecord, output_dir: &Path) -> Result<PathBuf> {
    pdf::generate_pdf(record, output_dir)
}

#[cfg(not(feature = "pdf"))]
pub fn export_document(_record: &AuditRecord, _output_dir: &Path) -> Result<PathBuf> {
    Err(crate::error::AuditError::ExportUnavailable)
}
