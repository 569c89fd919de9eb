//! CSV rendering for the transaction export.

use crate::{Error, transaction::TransactionRow};

/// The column headers shared by all export formats.
pub(super) const EXPORT_HEADERS: [&str; 5] = ["Date", "Category", "Type", "Amount", "Note"];

/// Render the rows as CSV bytes. The `csv` crate takes care of RFC 4180
/// quoting for notes containing commas or quotes.
pub fn write_csv(rows: &[TransactionRow]) -> Result<Vec<u8>, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(EXPORT_HEADERS)
        .map_err(|error| Error::ExportError(error.to_string()))?;

    for row in rows {
        writer
            .write_record([
                row.transaction.date.to_string(),
                row.category_title.clone(),
                row.category_kind.as_str().to_owned(),
                format!("{:.2}", row.transaction.amount),
                row.transaction.note.clone().unwrap_or_default(),
            ])
            .map_err(|error| Error::ExportError(error.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::ExportError(error.to_string()))
}

#[cfg(test)]
mod csv_export_tests {
    use time::macros::date;

    use crate::{
        category::CategoryKind,
        transaction::{Transaction, TransactionRow},
    };

    use super::write_csv;

    fn row(amount: f64, note: Option<&str>) -> TransactionRow {
        TransactionRow {
            transaction: Transaction {
                id: 1,
                amount,
                date: date!(2025 - 06 - 01),
                note: note.map(str::to_owned),
                category_id: 1,
            },
            category_title: "Groceries".to_owned(),
            category_icon: "🛒".to_owned(),
            category_kind: CategoryKind::Expense,
        }
    }

    #[test]
    fn writes_header_and_rows() {
        let rows = vec![row(12.5, Some("Weekly shop"))];

        let bytes = write_csv(&rows).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Date,Category,Type,Amount,Note"));
        assert_eq!(
            lines.next(),
            Some("2025-06-01,Groceries,Expense,12.50,Weekly shop")
        );
    }

    #[test]
    fn quotes_notes_with_commas_and_quotes() {
        let rows = vec![row(1.0, Some("He said \"hi\", twice"))];

        let bytes = write_csv(&rows).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.contains("\"He said \"\"hi\"\", twice\""));
    }

    #[test]
    fn missing_note_is_an_empty_field() {
        let rows = vec![row(1.0, None)];

        let bytes = write_csv(&rows).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.lines().nth(1).unwrap().ends_with("1.00,"));
    }
}
