use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("保存容量を超過しました（{size}バイト）。写真を削除してから再試行してください")]
    QuotaExceeded { size: usize },

    #[error("保存データが破損しています: {0}")]
    Corrupt(String),

    #[error("画像の読み込みに失敗しました: {0}")]
    ImageDecode(String),

    #[error("PDF生成エラー: {0}")]
    Render(String),

    #[error("PDF出力機能が利用できません")]
    ExportUnavailable,

    #[error("対象の要素が見つかりません: {0}")]
    NodeNotFound(String),

    #[error("JSON解析エラー: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AuditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_quota() {
        let error = AuditError::QuotaExceeded { size: 6_000_000 };
        let display = format!("{}", error);
        assert!(display.contains("6000000"));
        assert!(display.contains("写真を削除"));
    }

    #[test]
    fn test_error_display_node_not_found() {
        let error = AuditError::NodeNotFound("equip-7".to_string());
        let display = format!("{}", error);
        assert!(display.contains("equip-7"));
    }

    #[test]
    fn test_error_from_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error: AuditError = io_error.into();
        assert!(matches!(error, AuditError::Io(_)));
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: AuditError = json_error.into();
        assert!(matches!(error, AuditError::Json(_)));
    }
}
