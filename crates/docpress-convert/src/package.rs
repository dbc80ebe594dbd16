//! ZIP packaging for operations that produce more than one output file.

use std::io::{Cursor, Write};

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::ConversionError;

/// Package named entries into an in-memory ZIP archive, preserving entry
/// order.
pub fn zip_files(entries: &[(String, Vec<u8>)]) -> Result<Vec<u8>, ConversionError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, data) in entries {
        writer.start_file(name.as_str(), options)?;
        writer.write_all(data)?;
    }

    Ok(writer.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use zip::ZipArchive;

    #[test]
    fn entries_round_trip_with_names_in_order() {
        let archive = zip_files(&[
            ("page-1.pdf".to_string(), b"first".to_vec()),
            ("page-2.pdf".to_string(), b"second".to_vec()),
        ])
        .unwrap();

        let mut zip = ZipArchive::new(Cursor::new(archive)).unwrap();
        assert_eq!(zip.len(), 2);
        assert_eq!(zip.by_index(0).unwrap().name(), "page-1.pdf");
        assert_eq!(zip.by_index(1).unwrap().name(), "page-2.pdf");

        let mut content = Vec::new();
        std::io::copy(&mut zip.by_name("page-2.pdf").unwrap(), &mut content).unwrap();
        assert_eq!(content, b"second");
    }

    #[test]
    fn empty_archive_is_valid() {
        let archive = zip_files(&[]).unwrap();
        let zip = ZipArchive::new(Cursor::new(archive)).unwrap();
        assert_eq!(zip.len(), 0);
    }
}
