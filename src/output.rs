use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::pipeline::MergedRecord;

/// Final column schema: internal key on the left, display name on the right.
/// Fixed regardless of which attributes any individual product carried;
/// extra detail keys are dropped, missing ones become empty cells.
const COLUMNS: [(&str, &str); 9] = [
    ("asin", "ASIN"),
    ("name", "name"),
    ("url", "ProductUrl"),
    ("rating", "ProductRating"),
    ("price", "ProductPrice"),
    ("review", "ProductReview"),
    ("Description", "Description"),
    ("Manufacturer", "Manufacturer"),
    ("ProductDescription", "ProductDescription"),
];

pub fn write_csv_file(path: impl AsRef<Path>, rows: &[MergedRecord]) -> csv::Result<()> {
    write_csv(File::create(path)?, rows)
}

pub fn write_csv<W: Write>(writer: W, rows: &[MergedRecord]) -> csv::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);

    csv.write_record(COLUMNS.iter().map(|(_, display)| *display))?;
    for row in rows {
        csv.write_record(
            COLUMNS
                .iter()
                .map(|(key, _)| row.get(*key).map(String::as_str).unwrap_or("")),
        )?;
    }

    csv.flush()?;
    Ok(())
}
