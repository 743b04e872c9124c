use std::io::Read;

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use indexmap::IndexMap;
use tar::{Archive, Builder, Header};

use crate::error::BundleError;

/// Write `(path, contents)` pairs into a tar.gz archive, in iteration order.
pub fn write_archive<'f>(
    files: impl IntoIterator<Item = (&'f str, &'f str)>,
) -> Result<Vec<u8>, BundleError> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = Builder::new(encoder);

    for (path, contents) in files {
        let mut header = Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(0);
        builder.append_data(&mut header, path, contents.as_bytes())?;
    }

    let encoder = builder.into_inner()?;
    Ok(encoder.finish()?)
}

/// Read a tar.gz archive back into an ordered path to contents map.
pub fn read_archive(data: &[u8]) -> Result<IndexMap<String, String>, BundleError> {
    let mut archive = Archive::new(GzDecoder::new(data));
    let mut files = IndexMap::new();

    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.to_string_lossy().replace('\\', "/");
        let mut contents = String::new();
        entry.read_to_string(&mut contents)?;
        files.insert(path, contents);
    }
    Ok(files)
}
