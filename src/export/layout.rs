//! 診断書レイアウト設定
//!
//! mm基準のページ寸法と行送り・折り返しの計算。
//! 描画バックエンドに依存しない部分をここに置く。

// ============================================
// ページ寸法（mm）
// ============================================

/// A4サイズ（mm）
pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

/// 余白（mm）
pub const MARGIN_MM: f32 = 15.0;

/// 利用可能幅（mm）
pub const USABLE_WIDTH_MM: f32 = PAGE_WIDTH_MM - MARGIN_MM * 2.0; // 180mm

/// 改ページ判定のしきい値（mm）。残りがこれ未満なら新しいページへ
pub const PAGE_BREAK_THRESHOLD_MM: f32 = 15.0;

/// 画像の最大描画高さ（mm）
pub const MAX_IMAGE_HEIGHT_MM: f32 = 120.0;

/// 画像下の余白（mm）
pub const IMAGE_GAP_MM: f32 = 5.0;

// ============================================
// 行送り
// ============================================

/// フォントサイズ(pt)から1行の高さ(mm)への係数
pub const LINE_FACTOR: f32 = 0.4;

/// ブロック間の行間（mm）
pub const LINE_GAP_MM: f32 = 3.0;

/// pt → mm 変換係数
pub const PT_TO_MM: f32 = 25.4 / 72.0;

/// Helvetica平均グリフ幅の概算係数（em比）
pub const HELVETICA_AVG_WIDTH: f32 = 0.5;

/// 画像埋め込み時の基準DPI
pub const IMAGE_DPI: f32 = 300.0;

// ============================================
// フォントサイズ
// ============================================

pub const TITLE_FONT_SIZE: f32 = 16.0;
pub const HEADING_FONT_SIZE: f32 = 13.0;
pub const BODY_FONT_SIZE: f32 = 11.0;

// ============================================
// 基本情報フィールド定義
// ============================================

/// 診断書に出力するフィールド
#[derive(Debug, Clone, Copy)]
pub struct FieldDefinition {
    pub key: &'static str,
    pub label: &'static str,
}

/// 基本情報の出力順（固定）
pub const BASIC_FIELD_LABELS: &[FieldDefinition] = &[
    FieldDefinition { key: "companyName", label: "Company Name" },
    FieldDefinition { key: "address", label: "Address" },
    FieldDefinition { key: "date", label: "Audit Date" },
    FieldDefinition { key: "products", label: "Main Products" },
    FieldDefinition { key: "volume", label: "Annual Production Volume" },
    FieldDefinition { key: "shiftCount", label: "Shifts per Day" },
    FieldDefinition { key: "employeeCount", label: "Employees" },
    FieldDefinition { key: "rawMaterials", label: "Raw Materials" },
    FieldDefinition { key: "plantArea", label: "Plant Area" },
    FieldDefinition { key: "processDescription", label: "Process Description" },
];

// ============================================
// 計算ヘルパー
// ============================================

/// テキストブロックの行送り量（mm）
#[inline]
pub fn line_advance_mm(font_size: f32, line_count: usize) -> f32 {
    line_count as f32 * (font_size * LINE_FACTOR) + LINE_GAP_MM
}

/// 指定幅に収まる1行あたりの概算文字数
pub fn max_chars_per_line(font_size: f32, width_mm: f32) -> usize {
    let char_width_mm = font_size * HELVETICA_AVG_WIDTH * PT_TO_MM;
    ((width_mm / char_width_mm) as usize).max(1)
}

/// 利用可能幅に合わせた貪欲な単語折り返し。
/// 収まらない長大語は文字単位で分割する
pub fn wrap_text(text: &str, font_size: f32, width_mm: f32) -> Vec<String> {
    let max_chars = max_chars_per_line(font_size, width_mm);
    let mut lines = Vec::new();

    for raw_line in text.split('\n') {
        if raw_line.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        for word in raw_line.split_whitespace() {
            let word_len = word.chars().count();
            let current_len = current.chars().count();

            if current.is_empty() && word_len <= max_chars {
                current.push_str(word);
            } else if current_len + 1 + word_len <= max_chars {
                current.push(' ');
                current.push_str(word);
            } else {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                if word_len <= max_chars {
                    current.push_str(word);
                } else {
                    // 1語で幅を超える場合は文字単位で割る
                    let chars: Vec<char> = word.chars().collect();
                    for chunk in chars.chunks(max_chars) {
                        lines.push(chunk.iter().collect());
                    }
                }
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions() {
        assert!((USABLE_WIDTH_MM - 180.0).abs() < 0.01);
        assert!((PAGE_HEIGHT_MM - 297.0).abs() < 0.01);
        assert!((MARGIN_MM - 15.0).abs() < 0.01);
    }

    #[test]
    fn test_line_advance_formula() {
        // lineCount * (size * 0.4) + 3
        assert!((line_advance_mm(12.0, 1) - 7.8).abs() < 0.001);
        assert!((line_advance_mm(12.0, 3) - 17.4).abs() < 0.001);
        assert!((line_advance_mm(16.0, 1) - 9.4).abs() < 0.001);
    }

    #[test]
    fn test_wrap_short_text_single_line() {
        let lines = wrap_text("Main boiler", 11.0, USABLE_WIDTH_MM);
        assert_eq!(lines, vec!["Main boiler".to_string()]);
    }

    #[test]
    fn test_wrap_long_text_multiple_lines() {
        let text = "casting machining assembly ".repeat(10);
        let lines = wrap_text(&text, 11.0, USABLE_WIDTH_MM);
        assert!(lines.len() > 1);
        let max = max_chars_per_line(11.0, USABLE_WIDTH_MM);
        for line in &lines {
            assert!(line.chars().count() <= max, "折り返し幅を超えた行: {}", line);
        }
    }

    #[test]
    fn test_wrap_respects_explicit_newlines() {
        let lines = wrap_text("line one\n\nline three", 11.0, USABLE_WIDTH_MM);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "");
    }

    #[test]
    fn test_wrap_splits_overlong_word() {
        let word = "x".repeat(500);
        let lines = wrap_text(&word, 11.0, USABLE_WIDTH_MM);
        assert!(lines.len() > 1);
    }

    #[test]
    fn test_wrap_empty_text_is_one_blank_line() {
        assert_eq!(wrap_text("", 11.0, USABLE_WIDTH_MM).len(), 1);
    }

    #[test]
    fn test_basic_field_order() {
        assert_eq!(BASIC_FIELD_LABELS.len(), 10);
        assert_eq!(BASIC_FIELD_LABELS[0].key, "companyName");
        assert_eq!(BASIC_FIELD_LABELS[9].key, "processDescription");
    }
}
