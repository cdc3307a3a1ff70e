//! Binary PPM (P6) input and output.
//!
//! Only 8-bit files (maxval 255) are accepted. Header tokens are
//! whitespace separated and may be interleaved with `#` comments that run
//! to the end of the line. Exactly one whitespace byte separates the
//! maxval from the raster.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{try_alloc_vec, RgbImage};

fn invalid(reason: impl Into<String>) -> Error {
    Error::InvalidPpm {
        reason: reason.into(),
    }
}

/// Load a P6 file from disk.
pub fn load_ppm(path: impl AsRef<Path>) -> Result<RgbImage> {
    let file = File::open(path)?;
    read_ppm(BufReader::new(file))
}

/// Parse a P6 stream.
pub fn read_ppm<R: BufRead>(mut reader: R) -> Result<RgbImage> {
    let magic = read_token(&mut reader)?;
    if magic != "P6" {
        return Err(invalid(format!("unsupported magic '{magic}', expected P6")));
    }

    let width = parse_number(&mut reader, "width")?;
    let height = parse_number(&mut reader, "height")?;
    let max_val = parse_number(&mut reader, "maxval")?;
    if max_val != 255 {
        return Err(invalid(format!(
            "unsupported maxval {max_val}, only 255 is supported"
        )));
    }

    let len = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(3))
        .ok_or(Error::InvalidDimensions { width, height })?;
    let mut data = try_alloc_vec::<u8>(len)?;
    data.resize(len, 0);
    reader.read_exact(&mut data).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            invalid(format!("raster truncated, expected {len} bytes"))
        } else {
            Error::Io(e)
        }
    })?;

    log::debug!("ppm: read {width}x{height}");
    RgbImage::from_rgb_bytes(&data, width, height)
}

/// Write an image to disk as P6.
pub fn save_ppm(path: impl AsRef<Path>, image: &RgbImage) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_ppm(&mut writer, image)?;
    writer.flush()?;
    Ok(())
}

/// Serialize an image as P6.
pub fn write_ppm<W: Write>(mut writer: W, image: &RgbImage) -> Result<()> {
    write!(writer, "P6\n{} {}\n255\n", image.width(), image.height())?;
    writer.write_all(&image.to_rgb_bytes())?;
    Ok(())
}

fn parse_number<R: BufRead>(reader: &mut R, field: &str) -> Result<usize> {
    let token = read_token(reader)?;
    token
        .parse()
        .map_err(|_| invalid(format!("invalid {field} '{token}'")))
}

/// Read next whitespace-delimited token, skipping comments.
///
/// Consumes the single whitespace byte that ends the token.
fn read_token<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut token = String::new();
    let mut in_comment = false;

    loop {
        let mut byte = [0u8; 1];
        if reader.read(&mut byte)? == 0 {
            break;
        }

        let ch = byte[0] as char;

        if in_comment {
            if ch == '\n' || ch == '\r' {
                in_comment = false;
            }
            continue;
        }

        if ch == '#' && token.is_empty() {
            in_comment = true;
            continue;
        }

        if ch.is_ascii_whitespace() {
            if !token.is_empty() {
                break;
            }
            continue;
        }

        token.push(ch);
        if token.len() > 20 {
            return Err(invalid("header token too long"));
        }
    }

    if token.is_empty() {
        return Err(invalid("unexpected end of header"));
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_with_comments() {
        let mut data = b"P6\n# made by hand\n2 1 # trailing\n255\n".to_vec();
        data.extend_from_slice(&[1, 2, 3, 250, 251, 252]);
        let img = read_ppm(Cursor::new(data)).unwrap();
        assert_eq!((img.width(), img.height()), (2, 1));
        assert_eq!(img.get(1, 0), Some(&[250, 251, 252]));
    }

    #[test]
    fn test_raster_starting_with_whitespace_byte() {
        // First pixel byte is '\n'; only one separator is consumed
        let mut data = b"P6 1 1 255\n".to_vec();
        data.extend_from_slice(&[b'\n', b' ', 7]);
        let img = read_ppm(Cursor::new(data)).unwrap();
        assert_eq!(img.get(0, 0), Some(&[b'\n', b' ', 7]));
    }

    #[test]
    fn test_write_then_read() {
        let img = RgbImage::from_rgb_bytes(&[9, 8, 7, 6, 5, 4], 1, 2).unwrap();
        let mut out = Vec::new();
        write_ppm(&mut out, &img).unwrap();
        assert!(out.starts_with(b"P6\n1 2\n255\n"));
        assert_eq!(read_ppm(Cursor::new(out)).unwrap(), img);
    }

    #[test]
    fn test_rejects_bad_headers() {
        let cases: [&[u8]; 4] = [
            b"P3\n1 1\n255\n",
            b"P6\n1 1\n65535\n",
            b"P6\nx 1\n255\n",
            b"P6\n1",
        ];
        for case in cases {
            assert!(
                matches!(read_ppm(Cursor::new(case)), Err(Error::InvalidPpm { .. })),
                "accepted {:?}",
                String::from_utf8_lossy(case)
            );
        }
    }

    #[test]
    fn test_truncated_raster() {
        let data = b"P6\n2 2\n255\n\x01\x02\x03".to_vec();
        assert!(matches!(
            read_ppm(Cursor::new(data)),
            Err(Error::InvalidPpm { .. })
        ));
    }
}
