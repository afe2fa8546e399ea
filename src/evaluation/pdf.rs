//! Evaluation document rendering.
//!
//! Builds an A4 PDF directly with lopdf: standard Helvetica faces in
//! WinAnsi encoding, greedy word wrap, and a fresh page whenever the cursor
//! reaches the bottom margin. The logo is optional; a missing or undecodable
//! file is logged and the header is drawn without it.

use std::path::Path;

use chrono::DateTime;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use thiserror::Error;

use super::rubric::{Category, Criterion};
use crate::db::DbEvaluation;

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 50.0;
const BODY_SIZE: f32 = 10.0;
const LOGO_MAX_WIDTH: f32 = 110.0;
const LOGO_MAX_HEIGHT: f32 = 50.0;
/// Helvetica averages roughly half an em per glyph.
const AVG_GLYPH_EM: f32 = 0.5;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("Write failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Copy)]
enum Face {
    Regular,
    Bold,
}

impl Face {
    fn resource(self) -> &'static str {
        match self {
            Face::Regular => "F1",
            Face::Bold => "F2",
        }
    }
}

/// Map text to WinAnsi bytes; anything outside Latin-1 becomes `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            c if (c as u32) < 0x80 || ((c as u32) >= 0xA0 && (c as u32) <= 0xFF) => c as u8,
            _ => b'?',
        })
        .collect()
}

/// Greedy word wrap to at most `max_chars` per line. Long words are split.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            let word: String = word.into_iter().collect();
            let needed = if line.is_empty() {
                word.chars().count()
            } else {
                line.chars().count() + 1 + word.chars().count()
            };
            if needed > max_chars && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&word);
        }
        lines.push(line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Page-by-page operation buffer with a top-down cursor.
struct PageWriter {
    pages: Vec<Vec<Operation>>,
    y: f32,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn ops(&mut self) -> &mut Vec<Operation> {
        // `pages` is never empty
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn ensure_room(&mut self, height: f32) {
        if self.y - height < MARGIN {
            self.pages.push(Vec::new());
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn text_at(&mut self, x: f32, y: f32, size: f32, face: Face, text: &str) {
        let ops = self.ops();
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![face.resource().into(), size.into()],
        ));
        ops.push(Operation::new("Td", vec![x.into(), y.into()]));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(win_ansi(text), StringFormat::Literal)],
        ));
        ops.push(Operation::new("ET", vec![]));
    }

    /// Wrapped paragraph starting at `indent` from the left margin.
    fn paragraph(&mut self, text: &str, size: f32, face: Face, indent: f32) {
        let width = PAGE_WIDTH - 2.0 * MARGIN - indent;
        let max_chars = (width / (size * AVG_GLYPH_EM)) as usize;
        let leading = size * 1.4;
        for line in wrap(text, max_chars) {
            self.ensure_room(leading);
            self.y -= leading;
            self.text_at(MARGIN + indent, self.y, size, face, &line);
        }
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
    }

    fn rule(&mut self, x1: f32, x2: f32, y: f32) {
        let ops = self.ops();
        ops.push(Operation::new("w", vec![0.5f32.into()]));
        ops.push(Operation::new("m", vec![x1.into(), y.into()]));
        ops.push(Operation::new("l", vec![x2.into(), y.into()]));
        ops.push(Operation::new("S", vec![]));
    }

    fn heading(&mut self, text: &str) {
        self.ensure_room(40.0);
        self.gap(8.0);
        self.paragraph(text, 12.0, Face::Bold, 0.0);
        self.rule(MARGIN, PAGE_WIDTH - MARGIN, self.y - 4.0);
        self.gap(6.0);
    }

    fn field(&mut self, label: &str, value: &str) {
        self.paragraph(&format!("{}: {}", label, value), BODY_SIZE, Face::Regular, 0.0);
    }
}

fn format_timestamp(created_at: &str) -> String {
    DateTime::parse_from_rfc3339(created_at)
        .map(|dt| dt.format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_else(|_| created_at.to_string())
}

fn answer_for(evaluation: &DbEvaluation, category: Category) -> &str {
    match category {
        Category::Attendance => &evaluation.attendance,
        Category::Safety => &evaluation.safety,
        Category::Productivity => &evaluation.productivity,
        Category::Teamwork => &evaluation.teamwork,
    }
}

fn layout(evaluation: &DbEvaluation, logo_drawn: bool) -> Vec<Vec<Operation>> {
    let mut w = PageWriter::new();

    let title_x = if logo_drawn {
        MARGIN + LOGO_MAX_WIDTH + 15.0
    } else {
        MARGIN
    };
    let kind = if evaluation.evaluation_type.is_empty() {
        String::new()
    } else {
        format!(" - {}", evaluation.evaluation_type)
    };
    w.text_at(
        title_x,
        PAGE_HEIGHT - MARGIN - 20.0,
        15.0,
        Face::Bold,
        &format!("Avaliação de Experiência{}", kind),
    );
    w.text_at(
        title_x,
        PAGE_HEIGHT - MARGIN - 38.0,
        BODY_SIZE,
        Face::Regular,
        &format!("Emitido em {}", format_timestamp(&evaluation.created_at)),
    );
    w.y = PAGE_HEIGHT - MARGIN - LOGO_MAX_HEIGHT - 10.0;

    w.heading("Identificação");
    w.field("Colaborador", &evaluation.employee_name);
    w.field("Função", &evaluation.employee_role);
    w.field("Avaliador", &evaluation.evaluator_name);
    w.field("Cargo do avaliador", &evaluation.evaluator_role);
    w.field("Registro", &evaluation.id);

    w.heading("Critérios avaliados");
    for criterion in super::rubric::RUBRIC.iter() {
        w.ensure_room(36.0);
        w.gap(4.0);
        w.paragraph(criterion.title, 11.0, Face::Bold, 0.0);
        let answer = answer_for(evaluation, criterion.category);
        let rank = Criterion::for_category(criterion.category)
            .rank(answer)
            .map(|r| format!(" ({}/4)", r))
            .unwrap_or_default();
        w.paragraph(&format!("{}{}", answer, rank), BODY_SIZE, Face::Regular, 12.0);
    }

    w.heading("Resultado");
    w.field("Classificação geral", &evaluation.classification);
    w.field("Decisão", &evaluation.decision);

    if let Some(comments) = evaluation.comments.as_deref().filter(|c| !c.trim().is_empty()) {
        w.heading("Observações");
        w.paragraph(comments, BODY_SIZE, Face::Regular, 0.0);
    }

    // Signature lines: three side by side.
    w.ensure_room(90.0);
    w.gap(70.0);
    let slot = (PAGE_WIDTH - 2.0 * MARGIN) / 3.0;
    let line_y = w.y;
    for (i, label) in ["Avaliador", "Colaborador", "Recursos Humanos"].iter().enumerate() {
        let x1 = MARGIN + slot * i as f32 + 10.0;
        let x2 = x1 + slot - 20.0;
        w.rule(x1, x2, line_y);
        w.text_at(x1, line_y - 14.0, 9.0, Face::Regular, label);
    }

    w.pages
}

fn load_logo(logo: Option<&Path>) -> Option<Stream> {
    let path = logo?;
    if !path.exists() {
        log::warn!("Logo not found at {}, rendering without it", path.display());
        return None;
    }
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("Could not read logo {}: {}", path.display(), e);
            return None;
        }
    };
    match lopdf::xobject::image_from(bytes) {
        Ok(stream) => Some(stream),
        Err(e) => {
            log::warn!("Could not decode logo {}: {}", path.display(), e);
            None
        }
    }
}

fn logo_size(image: &Stream) -> (f32, f32) {
    let dim = |key: &[u8]| image.dict.get(key).and_then(|o| o.as_i64()).unwrap_or(1).max(1) as f32;
    let (w, h) = (dim(b"Width"), dim(b"Height"));
    let scale = (LOGO_MAX_WIDTH / w).min(LOGO_MAX_HEIGHT / h);
    (w * scale, h * scale)
}

/// Render an evaluation to PDF bytes.
pub fn render_evaluation(
    evaluation: &DbEvaluation,
    logo: Option<&Path>,
) -> Result<Vec<u8>, RenderError> {
    let logo = load_logo(logo);
    let pages = layout(evaluation, logo.is_some());

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let total = pages.len();
    let mut page_ids: Vec<ObjectId> = Vec::with_capacity(total);
    for (index, mut operations) in pages.into_iter().enumerate() {
        if total > 1 {
            let label = format!("Página {} de {}", index + 1, total);
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 8.0f32.into()]),
                Operation::new("Td", vec![(PAGE_WIDTH - MARGIN - 60.0).into(), (MARGIN / 2.0).into()]),
                Operation::new("Tj", vec![Object::String(win_ansi(&label), StringFormat::Literal)]),
                Operation::new("ET", vec![]),
            ]);
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        page_ids.push(page_id);
    }

    let kids: Vec<Object> = page_ids.iter().map(|id| (*id).into()).collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => total as i64,
            "MediaBox" => vec![0.into(), 0.into(), Object::Real(PAGE_WIDTH), Object::Real(PAGE_HEIGHT)],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if let (Some(image), Some(first)) = (logo, page_ids.first()) {
        let (w, h) = logo_size(&image);
        let y = PAGE_HEIGHT - MARGIN - h;
        doc.insert_image(*first, image, (MARGIN, y), (w, h))?;
    }

    doc.compress();
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

/// Render and write to `path`.
pub fn write_evaluation_pdf(
    evaluation: &DbEvaluation,
    logo: Option<&Path>,
    path: &Path,
) -> Result<(), RenderError> {
    let bytes = render_evaluation(evaluation, logo)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, bytes)?;
    log::info!("Wrote {}", path.display());
    Ok(())
}
