//! Minimal PNG writer: 8-bit RGBA, no interlacing, no ancillary chunks.

use std::io::{self, Write};

use flate2::Compression;
use flate2::write::ZlibEncoder;
use serde::{Deserialize, Serialize};

const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];
const BYTES_PER_PIXEL: usize = 4;
const BIT_DEPTH: u8 = 8;
const COLOR_TYPE_RGBA: u8 = 6;
/// Compressed image data is split into IDAT chunks of at most this size.
const IDAT_CHUNK_LEN: usize = 64 * 1024;

/// Per-scanline filter types, numbered as in the PNG spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    None = 0,
    Sub = 1,
    Up = 2,
    Average = 3,
    Paeth = 4,
}

impl FilterType {
    const ALL: [FilterType; 5] = [
        FilterType::None,
        FilterType::Sub,
        FilterType::Up,
        FilterType::Average,
        FilterType::Paeth,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterStrategy {
    /// Per row, pick the filter with the smallest sum of absolute values of
    /// the filtered bytes read as signed.
    Adaptive,
    /// Use the same filter on every row.
    Fixed(FilterType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PngOptions {
    /// zlib level, 0 (store) to 9 (best).
    pub compression: u32,
    pub filter: FilterStrategy,
}

impl Default for PngOptions {
    fn default() -> Self {
        Self {
            compression: 9,
            filter: FilterStrategy::Adaptive,
        }
    }
}

/// Encode straight-alpha RGBA8 pixels as a PNG stream.
///
/// Bytes already handed to `writer` stay there if a later write fails; the
/// stream must then be considered unusable.
pub fn encode_rgba<W: Write + ?Sized>(
    writer: &mut W,
    width: u32,
    height: u32,
    rgba: &[u8],
    options: &PngOptions,
) -> io::Result<()> {
    let row_len = width as usize * BYTES_PER_PIXEL;
    if width == 0 || height == 0 || rgba.len() != row_len * height as usize {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "pixel buffer of {} bytes does not match {width}x{height} RGBA",
                rgba.len()
            ),
        ));
    }

    let filtered = filter_scanlines(rgba, row_len, options.filter);
    let compressed = compress(&filtered, options.compression)?;

    writer.write_all(&SIGNATURE)?;

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&width.to_be_bytes());
    ihdr.extend_from_slice(&height.to_be_bytes());
    // bit depth, color type, compression method, filter method, interlace
    ihdr.extend_from_slice(&[BIT_DEPTH, COLOR_TYPE_RGBA, 0, 0, 0]);
    write_chunk(writer, b"IHDR", &ihdr)?;

    for part in compressed.chunks(IDAT_CHUNK_LEN) {
        write_chunk(writer, b"IDAT", part)?;
    }
    write_chunk(writer, b"IEND", &[])?;
    Ok(())
}

fn write_chunk<W: Write + ?Sized>(writer: &mut W, kind: &[u8; 4], data: &[u8]) -> io::Result<()> {
    let len = u32::try_from(data.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "chunk too large"))?;
    let mut crc = crc32fast::Hasher::new();
    crc.update(kind);
    crc.update(data);

    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(kind)?;
    writer.write_all(data)?;
    writer.write_all(&crc.finalize().to_be_bytes())?;
    log::trace!(
        "wrote {} chunk ({len} bytes)",
        String::from_utf8_lossy(kind)
    );
    Ok(())
}

fn compress(data: &[u8], level: u32) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(
        Vec::with_capacity(data.len() / 2),
        Compression::new(level.min(9)),
    );
    encoder.write_all(data)?;
    encoder.finish()
}

/// Prefix every scanline with its filter type byte and filter it.
fn filter_scanlines(rgba: &[u8], row_len: usize, strategy: FilterStrategy) -> Vec<u8> {
    let rows = rgba.len() / row_len;
    let mut out = Vec::with_capacity(rows * (row_len + 1));
    let zero_row = vec![0u8; row_len];
    let mut candidate = vec![0u8; row_len];
    let mut best = vec![0u8; row_len];

    for (i, row) in rgba.chunks_exact(row_len).enumerate() {
        let prev = if i == 0 {
            &zero_row[..]
        } else {
            &rgba[(i - 1) * row_len..i * row_len]
        };

        let chosen = match strategy {
            FilterStrategy::Fixed(kind) => {
                apply_filter(kind, row, prev, &mut best);
                kind
            }
            FilterStrategy::Adaptive => {
                let mut best_kind = FilterType::None;
                let mut best_score = u64::MAX;
                for kind in FilterType::ALL {
                    apply_filter(kind, row, prev, &mut candidate);
                    let score = signed_abs_sum(&candidate);
                    if score < best_score {
                        best_score = score;
                        best_kind = kind;
                        std::mem::swap(&mut best, &mut candidate);
                    }
                }
                best_kind
            }
        };

        out.push(chosen as u8);
        out.extend_from_slice(&best);
    }
    out
}

fn signed_abs_sum(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .map(|&b| u64::from((b as i8).unsigned_abs()))
        .sum()
}

fn apply_filter(kind: FilterType, row: &[u8], prev: &[u8], out: &mut [u8]) {
    for i in 0..row.len() {
        let left = if i >= BYTES_PER_PIXEL { row[i - BYTES_PER_PIXEL] } else { 0 };
        let up = prev[i];
        let up_left = if i >= BYTES_PER_PIXEL { prev[i - BYTES_PER_PIXEL] } else { 0 };
        let predicted = match kind {
            FilterType::None => 0,
            FilterType::Sub => left,
            FilterType::Up => up,
            FilterType::Average => ((u16::from(left) + u16::from(up)) / 2) as u8,
            FilterType::Paeth => paeth(left, up, up_left),
        };
        out[i] = row[i].wrapping_sub(predicted);
    }
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = i16::from(a) + i16::from(b) - i16::from(c);
    let pa = (p - i16::from(a)).abs();
    let pb = (p - i16::from(b)).abs();
    let pc = (p - i16::from(c)).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}
