//! 写真ペイロード
//!
//! 写真はbase64のdata URI文字列として保持する。保存スナップショットには
//! そのままJSON文字列として埋め込まれ、レイアウト計算時のみデコードして
//! ピクセル寸法を取り出す。

use crate::error::{AuditError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};

/// エンコード済み画像（data URI）。データモデル上は寸法以外不透明
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoPayload(String);

impl PhotoPayload {
    /// 既存のdata URI文字列から生成（デコード検証なし）
    pub fn from_data_uri(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// 生バイト列から生成。デコードできない画像はエラー
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        // 先にデコードして画像として成立することを確認する
        image::load_from_memory(bytes).map_err(|e| AuditError::ImageDecode(e.to_string()))?;

        let mime = match image::guess_format(bytes) {
            Ok(image::ImageFormat::Jpeg) => "image/jpeg",
            Ok(image::ImageFormat::Png) => "image/png",
            Ok(image::ImageFormat::Gif) => "image/gif",
            Ok(image::ImageFormat::Bmp) => "image/bmp",
            _ => "image/png",
        };
        Ok(Self(format!("data:{};base64,{}", mime, STANDARD.encode(bytes))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// data URIのbase64部分を取り出してデコード
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let encoded = match self.0.find(";base64,") {
            Some(pos) => &self.0[pos + ";base64,".len()..],
            // プレフィックスなしのbase64も受け付ける
            None => self.0.as_str(),
        };
        STANDARD
            .decode(encoded.trim())
            .map_err(|e| AuditError::ImageDecode(e.to_string()))
    }

    pub fn decode(&self) -> Result<DynamicImage> {
        let bytes = self.to_bytes()?;
        image::load_from_memory(&bytes).map_err(|e| AuditError::ImageDecode(e.to_string()))
    }

    /// ピクセル寸法（幅, 高さ）
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        Ok(self.decode()?.dimensions())
    }
}
