//! 診断書PDFレンダラ
//!
//! AuditRecordを固定順序でページ組みする。縦カーソルyは各ページの
//! 上余白から始まり、テキストは行数分、画像は描画高さ分だけ進む。
//! 個々の写真のデコード失敗は代替テキストに置き換えて続行し、
//! レンダリング全体の失敗時のみエクスポートを中断する。

use crate::error::{AuditError, Result};
use crate::export::layout::*;
use crate::export::{document_file_name, today_string};
use crate::photo::PhotoPayload;
use crate::record::AuditRecord;
use image::GenericImageView;
use printpdf::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// ページ組みの実体。yカーソルと現在レイヤーを持ち回る
pub struct DocumentComposer {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    y: f32,
    pages: usize,
}

impl DocumentComposer {
    pub fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(
            title,
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "Layer 1",
        );

        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| AuditError::Render(format!("フォント追加エラー: {:?}", e)))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| AuditError::Render(format!("フォント追加エラー: {:?}", e)))?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            font,
            font_bold,
            y: MARGIN_MM,
            pages: 1,
        })
    }

    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// 現在の縦カーソル（ページ上端からのmm）
    pub fn cursor_y(&self) -> f32 {
        self.y
    }

    fn break_page(&mut self) {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            format!("Layer {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = MARGIN_MM;
    }

    /// 残り高さがneeded未満なら改ページしてyを上余白へ戻す
    fn ensure_space(&mut self, needed_mm: f32) {
        if PAGE_HEIGHT_MM - MARGIN_MM - self.y < needed_mm {
            self.break_page();
        }
    }

    /// テキストブロックを折り返して書き、yを進める
    pub fn add_text(&mut self, text: &str, size: f32, bold: bool) {
        self.ensure_space(PAGE_BREAK_THRESHOLD_MM);

        let lines = wrap_text(text, size, USABLE_WIDTH_MM);
        let font = if bold { &self.font_bold } else { &self.font };
        let line_height = size * LINE_FACTOR;

        for (index, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let baseline = self.y + line_height * (index as f32 + 1.0);
            self.layer.use_text(
                line.clone(),
                size,
                Mm(MARGIN_MM),
                Mm(PAGE_HEIGHT_MM - baseline),
                font,
            );
        }

        self.y += line_advance_mm(size, lines.len());
    }

    /// キャプション付きで画像を配置する。
    /// デコード不能な画像は代替テキストで続行する
    pub fn add_image(&mut self, payload: &PhotoPayload, caption: &str) {
        let decoded = match payload.decode() {
            Ok(image) => image,
            Err(_) => {
                self.add_text(caption, BODY_FONT_SIZE, true);
                self.add_text("[image unavailable]", BODY_FONT_SIZE, false);
                return;
            }
        };

        let (px_width, px_height) = decoded.dimensions();
        if px_width == 0 || px_height == 0 {
            self.add_text(caption, BODY_FONT_SIZE, true);
            self.add_text("[image unavailable]", BODY_FONT_SIZE, false);
            return;
        }

        // 幅いっぱいに広げ、高さはアスペクト比から求めて上限でとめる
        let aspect = px_width as f32 / px_height as f32;
        let width = USABLE_WIDTH_MM;
        let mut height = width / aspect;
        if height > MAX_IMAGE_HEIGHT_MM {
            height = MAX_IMAGE_HEIGHT_MM;
        }

        // キャプションと画像のどちらかが入らないなら先に改ページ
        let caption_advance = line_advance_mm(BODY_FONT_SIZE, 1);
        self.ensure_space(caption_advance + height + IMAGE_GAP_MM);

        self.add_text(caption, BODY_FONT_SIZE, true);

        let natural_width_mm = px_width as f32 * 25.4 / IMAGE_DPI;
        let natural_height_mm = px_height as f32 * 25.4 / IMAGE_DPI;
        let pdf_image = Image::from_dynamic_image(&decoded);
        pdf_image.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(MARGIN_MM)),
                translate_y: Some(Mm(PAGE_HEIGHT_MM - self.y - height)),
                scale_x: Some(width / natural_width_mm),
                scale_y: Some(height / natural_height_mm),
                dpi: Some(IMAGE_DPI),
                ..Default::default()
            },
        );

        self.y += height + IMAGE_GAP_MM;
    }

    fn save_to(self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        self.doc
            .save(&mut BufWriter::new(file))
            .map_err(|e| AuditError::Render(format!("PDF保存エラー: {:?}", e)))?;
        Ok(())
    }
}

/// スナップショット全体を診断書としてページ組みし、
/// `{会社名}_Energy_Audit_{日付}.pdf` に書き出す
pub fn generate_pdf(record: &AuditRecord, output_dir: &Path) -> Result<PathBuf> {
    let file_name = document_file_name(record);
    let output_path = output_dir.join(&file_name);

    let mut composer = DocumentComposer::new("Energy Audit Report")?;
    render_record(&mut composer, record);

    // 途中失敗で不完全なファイルを残さないよう一時名で書いてから移す
    std::fs::create_dir_all(output_dir)?;
    let tmp_path = output_dir.join(format!("{}.tmp", file_name));
    if let Err(e) = composer.save_to(&tmp_path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }
    std::fs::rename(&tmp_path, &output_path)?;
    Ok(output_path)
}

fn render_record(composer: &mut DocumentComposer, record: &AuditRecord) {
    // 表題と日付
    composer.add_text("Energy Audit Report", TITLE_FONT_SIZE, true);
    let date = record.basic_info.date.trim();
    let date = if date.is_empty() {
        today_string()
    } else {
        date.to_string()
    };
    composer.add_text(&format!("Date: {}", date), BODY_FONT_SIZE, false);

    // 基本情報（固定順）
    for field in BASIC_FIELD_LABELS {
        let value = record.basic_info.get(field.key).unwrap_or("");
        let value = if value.trim().is_empty() { "-" } else { value };
        composer.add_text(&format!("{}: {}", field.label, value), BODY_FONT_SIZE, false);
    }

    if let Some(photo) = &record.plant_layout_photo {
        composer.add_image(photo, "Plant Layout");
    }
    if let Some(photo) = &record.process_photo {
        composer.add_image(photo, "Production Process");
    }

    // 設備インベントリ（作成順）
    for (type_index, equipment_type) in record.equipment_types.iter().enumerate() {
        let name = equipment_type.name.trim();
        let name = if name.is_empty() { "(unnamed)" } else { name };
        composer.add_text(
            &format!("{}. {}", type_index + 1, name),
            HEADING_FONT_SIZE,
            true,
        );

        for (inst_index, instance) in equipment_type.instances.iter().enumerate() {
            let description = if instance.description.trim().is_empty() {
                "-"
            } else {
                instance.description.as_str()
            };
            composer.add_text(
                &format!("Unit {}: {}", inst_index + 1, description),
                BODY_FONT_SIZE,
                false,
            );

            let hours = if instance.operating_hours.trim().is_empty() {
                "-"
            } else {
                instance.operating_hours.as_str()
            };
            composer.add_text(
                &format!("Operating hours per day: {}", hours),
                BODY_FONT_SIZE,
                false,
            );

            for input in &instance.energy_inputs {
                composer.add_text(&format!("- {}", input), BODY_FONT_SIZE, false);
            }

            for (photo_index, photo) in instance.photos.iter().enumerate() {
                composer.add_image(photo, &format!("Photo {}", photo_index + 1));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_text_advances_cursor() {
        let mut composer = DocumentComposer::new("test").expect("コンポーザ生成失敗");
        let y0 = composer.cursor_y();
        composer.add_text("Company Name: Acme Co", 12.0, false);
        // 1行 → 12 * 0.4 + 3 = 7.8mm
        assert!((composer.cursor_y() - y0 - 7.8).abs() < 0.001);
    }

    #[test]
    fn test_text_overflow_inserts_page_break() {
        let mut composer = DocumentComposer::new("test").expect("コンポーザ生成失敗");
        assert_eq!(composer.page_count(), 1);

        // 1ページの有効高さを確実に超える回数を書く
        for _ in 0..60 {
            composer.add_text("Measurement line", 12.0, false);
        }

        assert!(composer.page_count() >= 2, "改ページが発生していない");
        // 改ページ後のyは上余白から再スタートしてページ内に収まる
        assert!(composer.cursor_y() < PAGE_HEIGHT_MM - MARGIN_MM);
        assert!(composer.cursor_y() >= MARGIN_MM);
    }

    #[test]
    fn test_unreadable_image_becomes_placeholder() {
        let mut composer = DocumentComposer::new("test").expect("コンポーザ生成失敗");
        let y0 = composer.cursor_y();
        let broken = PhotoPayload::from_data_uri("data:image/png;base64,not-base64!!");

        composer.add_image(&broken, "Photo 1");

        // キャプション + 代替テキストの2ブロック分だけ進む
        let expected = line_advance_mm(BODY_FONT_SIZE, 1) * 2.0;
        assert!((composer.cursor_y() - y0 - expected).abs() < 0.001);
    }
}
