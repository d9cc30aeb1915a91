//! PDF rendering with `printpdf`.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use thiserror::Error;
use tripdesk_shared::AppError;

use super::document::Document;

/// PDF generation errors.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// printpdf failure.
    #[error("pdf generation failed: {0}")]
    Pdf(#[from] printpdf::Error),
}

impl From<ReceiptError> for AppError {
    fn from(err: ReceiptError) -> Self {
        Self::Internal(err.to_string())
    }
}

// A4 in millimetres; vertical positions are tracked as whole millimetres.
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const TOP: u16 = 277;
const BOTTOM: u16 = 25;
const LINE: u16 = 7;
const LEFT: f32 = 20.0;
const VALUE_COLUMN: f32 = 75.0;

struct Cursor {
    layer: PdfLayerReference,
    y: u16,
}

impl Cursor {
    fn at(&self) -> Mm {
        Mm(f32::from(self.y))
    }

    fn advance(&mut self, by: u16) {
        self.y = self.y.saturating_sub(by);
    }
}

/// Renders a document to PDF bytes.
///
/// # Errors
///
/// Returns `ReceiptError::Pdf` when fonts cannot be embedded or the document
/// cannot be serialized.
pub fn render_pdf(document: &Document) -> Result<Vec<u8>, ReceiptError> {
    let (doc, page, layer) = PdfDocument::new(
        document.title.as_str(),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let mut cursor = Cursor {
        layer: doc.get_page(page).get_layer(layer),
        y: TOP,
    };

    cursor
        .layer
        .use_text(document.title.as_str(), 20.0, Mm(LEFT), cursor.at(), &bold);
    cursor.advance(LINE + 2);
    cursor
        .layer
        .use_text(document.issuer.as_str(), 11.0, Mm(LEFT), cursor.at(), &regular);
    cursor.advance(LINE * 2);

    for section in &document.sections {
        ensure_room(&doc, &mut cursor, LINE * 2);
        cursor
            .layer
            .use_text(section.heading.as_str(), 13.0, Mm(LEFT), cursor.at(), &bold);
        cursor.advance(LINE);

        for (label, value) in &section.rows {
            ensure_room(&doc, &mut cursor, LINE);
            write_row(&cursor, label, value, &regular);
            cursor.advance(LINE);
        }
        cursor.advance(LINE / 2);
    }

    ensure_room(&doc, &mut cursor, LINE);
    cursor
        .layer
        .use_text(document.footer.as_str(), 9.0, Mm(LEFT), cursor.at(), &regular);

    Ok(doc.save_to_bytes()?)
}

fn write_row(cursor: &Cursor, label: &str, value: &str, font: &IndirectFontRef) {
    cursor.layer.use_text(label, 11.0, Mm(LEFT), cursor.at(), font);
    cursor
        .layer
        .use_text(value, 11.0, Mm(VALUE_COLUMN), cursor.at(), font);
}

fn ensure_room(
    doc: &printpdf::PdfDocumentReference,
    cursor: &mut Cursor,
    needed: u16,
) {
    if cursor.y < BOTTOM + needed {
        let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        cursor.layer = doc.get_page(page).get_layer(layer);
        cursor.y = TOP;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::document::Section;

    fn document(rows: usize) -> Document {
        Document {
            title: "Payment Receipt".to_string(),
            issuer: "Himalayan Trails".to_string(),
            sections: vec![Section {
                heading: "Receipt".to_string(),
                rows: (0..rows)
                    .map(|i| (format!("Row {i}"), format!("Value {i}")))
                    .collect(),
            }],
            footer: "Thanks".to_string(),
        }
    }

    #[test]
    fn test_render_produces_pdf() {
        let bytes = render_pdf(&document(5)).expect("should render");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_overflows_onto_new_pages() {
        let short = render_pdf(&document(3)).expect("should render");
        let long = render_pdf(&document(120)).expect("should render");
        assert!(long.starts_with(b"%PDF"));
        assert!(long.len() > short.len());
    }
}
