//! PDF rendering for the transaction export.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use unicode_segmentation::UnicodeSegmentation;

use crate::{Error, export::csv::EXPORT_HEADERS, transaction::TransactionRow};

// A4 landscape.
const PAGE_WIDTH_MM: f32 = 297.0;
const PAGE_HEIGHT_MM: f32 = 210.0;

const TITLE_FONT_SIZE: f32 = 16.0;
const BODY_FONT_SIZE: f32 = 10.0;
const LINE_HEIGHT_MM: f32 = 7.0;
const TOP_MARGIN_MM: f32 = 15.0;
const BOTTOM_MARGIN_MM: f32 = 15.0;

/// The left edge of each column, in millimetres.
const COLUMN_POSITIONS_MM: [f32; 5] = [10.0, 50.0, 120.0, 160.0, 195.0];

/// How many characters of the note fit in its column.
const NOTE_COLUMN_LENGTH: usize = 45;

/// Render the rows as an A4 landscape PDF table with a title line. Rows that
/// do not fit on a page continue on a new page with a fresh header row.
pub fn write_pdf(rows: &[TransactionRow]) -> Result<Vec<u8>, Error> {
    let (document, page, layer) = PdfDocument::new(
        "Transactions",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let font = document
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|error| Error::ExportError(error.to_string()))?;
    let bold_font = document
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|error| Error::ExportError(error.to_string()))?;

    let mut current_layer = document.get_page(page).get_layer(layer);
    let mut cursor_mm = PAGE_HEIGHT_MM - TOP_MARGIN_MM;

    current_layer.use_text(
        "Transactions",
        TITLE_FONT_SIZE,
        Mm(COLUMN_POSITIONS_MM[0]),
        Mm(cursor_mm),
        &bold_font,
    );
    cursor_mm -= LINE_HEIGHT_MM * 1.5;

    write_header_row(&current_layer, &bold_font, cursor_mm);
    cursor_mm -= LINE_HEIGHT_MM;

    for row in rows {
        if cursor_mm < BOTTOM_MARGIN_MM {
            let (page, layer) =
                document.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            current_layer = document.get_page(page).get_layer(layer);
            cursor_mm = PAGE_HEIGHT_MM - TOP_MARGIN_MM;

            write_header_row(&current_layer, &bold_font, cursor_mm);
            cursor_mm -= LINE_HEIGHT_MM;
        }

        let columns = [
            row.transaction.date.to_string(),
            row.category_title.clone(),
            row.category_kind.as_str().to_owned(),
            format!("{:.2}", row.transaction.amount),
            truncate_note(row.transaction.note.as_deref()),
        ];

        for (text, x_mm) in columns.iter().zip(COLUMN_POSITIONS_MM) {
            current_layer.use_text(text, BODY_FONT_SIZE, Mm(x_mm), Mm(cursor_mm), &font);
        }

        cursor_mm -= LINE_HEIGHT_MM;
    }

    document
        .save_to_bytes()
        .map_err(|error| Error::ExportError(error.to_string()))
}

fn write_header_row(layer: &PdfLayerReference, font: &IndirectFontRef, cursor_mm: f32) {
    for (header, x_mm) in EXPORT_HEADERS.iter().zip(COLUMN_POSITIONS_MM) {
        layer.use_text(*header, BODY_FONT_SIZE, Mm(x_mm), Mm(cursor_mm), font);
    }
}

fn truncate_note(note: Option<&str>) -> String {
    let Some(note) = note else {
        return String::new();
    };

    let graphemes: Vec<&str> = note.graphemes(true).collect();

    if graphemes.len() <= NOTE_COLUMN_LENGTH {
        note.to_owned()
    } else {
        let mut truncated: String = graphemes[..NOTE_COLUMN_LENGTH].concat();
        truncated.push('…');
        truncated
    }
}
