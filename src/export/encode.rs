//! Document encoder

use crate::error::ExportError;
use serde_json::Value;
use std::io::{BufWriter, Write};

/// Write `document` as JSON followed by a newline.
pub fn write_document<W: Write>(
    writer: W,
    document: &Value,
    pretty: bool,
) -> Result<(), ExportError> {
    let mut writer = BufWriter::new(writer);
    if pretty {
        serde_json::to_writer_pretty(&mut writer, document)?;
    } else {
        serde_json::to_writer(&mut writer, document)?;
    }
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
