//! XLSX rendering for the transaction export.

use rust_xlsxwriter::{Format, Workbook};

use crate::{Error, export::csv::EXPORT_HEADERS, transaction::TransactionRow};

/// Render the rows as an XLSX workbook with a bold header row. Amounts are
/// written as number cells so spreadsheets can sum them.
pub fn write_xlsx(rows: &[TransactionRow]) -> Result<Vec<u8>, Error> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let bold = Format::new().set_bold();

    for (column, header) in EXPORT_HEADERS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, column as u16, *header, &bold)
            .map_err(|error| Error::ExportError(error.to_string()))?;
    }

    for (index, row) in rows.iter().enumerate() {
        let excel_row = (index + 1) as u32;

        worksheet
            .write_string(excel_row, 0, row.transaction.date.to_string())
            .and_then(|worksheet| worksheet.write_string(excel_row, 1, &row.category_title))
            .and_then(|worksheet| {
                worksheet.write_string(excel_row, 2, row.category_kind.as_str())
            })
            .and_then(|worksheet| worksheet.write_number(excel_row, 3, row.transaction.amount))
            .and_then(|worksheet| {
                worksheet.write_string(
                    excel_row,
                    4,
                    row.transaction.note.as_deref().unwrap_or_default(),
                )
            })
            .map_err(|error| Error::ExportError(error.to_string()))?;
    }

    workbook
        .save_to_buffer()
        .map_err(|error| Error::ExportError(error.to_string()))
}
