//! Opening stores by format and converting between formats.

use std::fs;
use std::path::Path;

use tracing::info;

use super::reader::VectorStoreReader;
use super::text_reader::TextVectorStoreReader;
use super::traits::CloseableVectorStore;
use super::writer::{VectorStoreWriter, WriteSummary};
use crate::error::{Error, Result};
use crate::format::StoreFormat;

/// Opens a store of either format behind the common trait.
///
/// # Errors
///
/// Returns the open error of the chosen reader.
pub fn open_store(
    path: impl AsRef<Path>,
    format: StoreFormat,
) -> Result<Box<dyn CloseableVectorStore>> {
    let store: Box<dyn CloseableVectorStore> = match format {
        StoreFormat::Binary => Box::new(VectorStoreReader::open(path)?),
        StoreFormat::Text => Box::new(TextVectorStoreReader::open(path)?),
    };
    Ok(store)
}

/// Streams a store into another file, possibly in another format.
///
/// The input header, extra options included, is carried over unchanged. The
/// input is closed once the copy finishes, successfully or not.
///
/// The writer replaces its target before reading starts, so `input` and
/// `output` must be different files.
///
/// # Errors
///
/// Returns [`Error::SameSourceAndTarget`] if both paths resolve to the same
/// file, otherwise any open, read or write error.
pub fn translate(
    input: impl AsRef<Path>,
    input_format: StoreFormat,
    output: impl AsRef<Path>,
    output_format: StoreFormat,
    writer: &VectorStoreWriter,
) -> Result<WriteSummary> {
    let (input, output) = (input.as_ref(), output.as_ref());
    if same_file(input, output) {
        return Err(Error::SameSourceAndTarget(input.to_path_buf()));
    }
    let source = open_store(input, input_format)?;
    let result = writer.write(output, output_format, source.header(), &source);
    source.close();

    let summary = result?;
    info!(
        input = %input.display(),
        output = %output.display(),
        from = %input_format,
        to = %output_format,
        records = summary.records,
        "Translated vector store"
    );
    Ok(summary)
}

/// A missing output can never be the input.
fn same_file(input: &Path, output: &Path) -> bool {
    match (fs::canonicalize(input), fs::canonicalize(output)) {
        (Ok(input), Ok(output)) => input == output,
        _ => false,
    }
}
