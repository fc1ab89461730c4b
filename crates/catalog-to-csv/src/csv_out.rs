use std::io::Write;
use std::path::Path;

use csv::{Writer, WriterBuilder};

use crate::dataset::Dataset;
use crate::error::ExtractError;

fn write_rows<W: Write>(writer: &mut Writer<W>, dataset: &Dataset) -> Result<(), ExtractError> {
    writer.write_record(dataset.headers())?;
    for row in dataset.rows() {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

pub(crate) fn write_csv(path: &Path, dataset: &Dataset, delimiter: u8) -> Result<(), ExtractError> {
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_path(path)?;
    write_rows(&mut writer, dataset)
}

pub(crate) fn write_csv_to_string(
    dataset: &Dataset,
    delimiter: u8,
) -> Result<String, ExtractError> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::<u8>::new());
    write_rows(&mut writer, dataset)?;

    let bytes = writer
        .into_inner()
        .map_err(|error| ExtractError::Csv(error.into_error().into()))?;
    String::from_utf8(bytes)
        .map_err(|error| ExtractError::InvalidOption(format!("invalid utf-8 csv output: {error}")))
}
