use anyhow::{anyhow, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Chain, Cursor, Read};
use std::path::Path;

/// Input buffer size for sequence files
const INPUT_BUFFER_SIZE: usize = 1 << 16;

/// Compression detected from the leading magic bytes of a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Zstd,
    None,
}

impl Compression {
    /// Gzip is 1F 8B 08, zstd is 28 B5 2F FD
    fn from_magic(head: &[u8]) -> Self {
        if head.len() >= 3 && head[0] == 0x1F && head[1] == 0x8B && head[2] == 0x08 {
            Compression::Gzip
        } else if head.len() >= 4
            && head[0] == 0x28
            && head[1] == 0xB5
            && head[2] == 0x2F
            && head[3] == 0xFD
        {
            Compression::Zstd
        } else {
            Compression::None
        }
    }
}

/// Read up to four bytes, retrying short reads so pipes are detected correctly
fn read_magic<R: Read>(reader: &mut R, head: &mut [u8; 4]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < head.len() {
        match reader.read(&mut head[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Wrap any reader with transparent gzip/zstd decompression.
///
/// The sniffed bytes are put back in front of the stream with a cursor chain.
pub fn maybe_decompress<R: Read + Send + 'static>(
    mut reader: R,
) -> io::Result<(Box<dyn BufRead + Send>, Compression)> {
    let mut head = [0u8; 4];
    let n = read_magic(&mut reader, &mut head)?;

    let prefix = Cursor::new(head[..n].to_vec());
    let chained: Chain<Cursor<Vec<u8>>, R> = prefix.chain(reader);

    let compression = Compression::from_magic(&head[..n]);
    let boxed: Box<dyn BufRead + Send> = match compression {
        Compression::Gzip => Box::new(BufReader::with_capacity(
            INPUT_BUFFER_SIZE,
            MultiGzDecoder::new(chained),
        )),
        Compression::Zstd => Box::new(BufReader::with_capacity(
            INPUT_BUFFER_SIZE,
            zstd::Decoder::new(chained)?,
        )),
        Compression::None => Box::new(BufReader::with_capacity(INPUT_BUFFER_SIZE, chained)),
    };
    Ok((boxed, compression))
}

/// Open a sequence file (or stdin for `-`) with compression auto-detection
pub fn open_input<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead + Send>> {
    let path_ref = path.as_ref();

    if path_ref.as_os_str() == "-" {
        let (reader, compression) = maybe_decompress(io::stdin())?;
        log::debug!("reading stdin ({:?} compression)", compression);
        return Ok(reader);
    }

    if let Some(extension) = path_ref.extension().and_then(|ext| ext.to_str()) {
        if extension.eq_ignore_ascii_case("zip") {
            return Err(anyhow!(
                "ZIP archives are not supported, only gzip and zstd streams. Extract it first: unzip {}",
                path_ref.display()
            ));
        }
    }

    let file = File::open(path_ref)
        .map_err(|e| anyhow!("cannot open '{}': {}", path_ref.display(), e))?;
    let (reader, compression) = maybe_decompress(file)
        .map_err(|e| anyhow!("failed to detect compression of '{}': {}", path_ref.display(), e))?;
    log::debug!("opened {} ({:?} compression)", path_ref.display(), compression);
    Ok(reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn read_all(mut reader: Box<dyn BufRead + Send>) -> String {
        let mut content = String::new();
        reader.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_plain_file_passthrough() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        write!(temp_file, ">r1\nACGT\n")?;
        temp_file.flush()?;

        let reader = open_input(temp_file.path())?;
        assert_eq!(read_all(reader), ">r1\nACGT\n");
        Ok(())
    }

    #[test]
    fn test_gzip_file() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b">r1\nACGT\n")?;
        temp_file.write_all(&encoder.finish()?)?;
        temp_file.flush()?;

        let reader = open_input(temp_file.path())?;
        assert_eq!(read_all(reader), ">r1\nACGT\n");
        Ok(())
    }

    #[test]
    fn test_zstd_stream() -> Result<()> {
        let compressed = zstd::encode_all(&b">r1\nACGT\n"[..], 0)?;
        let (reader, compression) = maybe_decompress(Cursor::new(compressed))?;
        assert_eq!(compression, Compression::Zstd);
        assert_eq!(read_all(reader), ">r1\nACGT\n");
        Ok(())
    }

    #[test]
    fn test_short_input_is_plain() -> Result<()> {
        let (reader, compression) = maybe_decompress(Cursor::new(b">".to_vec()))?;
        assert_eq!(compression, Compression::None);
        assert_eq!(read_all(reader), ">");
        Ok(())
    }

    #[test]
    fn test_zip_rejected() {
        let err = open_input("sequences.zip").unwrap_err();
        assert!(err.to_string().contains("ZIP"));
    }
}
