use std::io::{self, BufRead, BufReader};

use log::debug;

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const BZIP2_MAGIC: &[u8] = b"BZh";
const LZ4_MAGIC: &[u8] = &[0x04, 0x22, 0x4d, 0x18];
const ZSTD_MAGIC: &[u8] = &[0x28, 0xb5, 0x2f, 0xfd];

/// Wrap `reader` in a decompressor if its content starts with the
/// magic bytes of a supported compression format
pub fn auto_decompress<'a, R: BufRead + 'a>(
    mut reader: R,
) -> io::Result<Box<dyn BufRead + 'a>> {
    let buf = reader.fill_buf()?;
    let decompressed: Box<dyn BufRead + 'a> = if buf.starts_with(GZIP_MAGIC) {
        debug!("Decompressing gzip input");
        Box::new(BufReader::new(flate2::bufread::MultiGzDecoder::new(reader)))
    } else if buf.starts_with(BZIP2_MAGIC) {
        debug!("Decompressing bzip2 input");
        Box::new(BufReader::new(bzip2::bufread::MultiBzDecoder::new(reader)))
    } else if buf.starts_with(LZ4_MAGIC) {
        debug!("Decompressing lz4 input");
        Box::new(BufReader::new(lz4_flex::frame::FrameDecoder::new(reader)))
    } else if buf.starts_with(ZSTD_MAGIC) {
        debug!("Decompressing zstd input");
        Box::new(BufReader::new(zstd::stream::read::Decoder::with_buffer(reader)?))
    } else {
        Box::new(reader)
    };
    Ok(decompressed)
}
