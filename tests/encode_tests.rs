//! Integration tests for the JPEG encoder.
//!
//! These tests verify the public API of the encoder.

use baseline_jpeg::consts::{
    AC_CHROMINANCE_BITS, AC_CHROMINANCE_VALUES, AC_LUMINANCE_BITS, AC_LUMINANCE_VALUES,
    DC_CHROMINANCE_BITS, DC_CHROMINANCE_VALUES, DC_LUMINANCE_BITS, DC_LUMINANCE_VALUES,
};
use baseline_jpeg::rle::RleToken;
use baseline_jpeg::{Backend, Channel, Encoder, Error, QuantTable, RgbImage};

/// Deterministic pseudo-random bytes.
fn noise(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        })
        .collect()
}

fn gradient(width: usize, height: usize) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            let v = ((x * 255) / width.max(2).saturating_sub(1).max(1)).min(255) as u8;
            rgb.extend_from_slice(&[v, ((y * 4) % 256) as u8, 255 - v]);
        }
    }
    rgb
}

/// Offset of the first scan byte (just past the SOS header).
fn scan_start(jpeg: &[u8]) -> usize {
    let mut pos = 2;
    loop {
        assert_eq!(jpeg[pos], 0xFF, "expected marker at {pos}");
        let marker = jpeg[pos + 1];
        let len = u16::from_be_bytes([jpeg[pos + 2], jpeg[pos + 3]]) as usize;
        pos += 2 + len;
        if marker == 0xDA {
            return pos;
        }
    }
}

fn decode(jpeg: &[u8]) -> (Vec<u8>, u16, u16) {
    let mut decoder = jpeg_decoder::Decoder::new(std::io::Cursor::new(jpeg));
    let pixels = decoder.decode().expect("Failed to decode JPEG");
    let info = decoder.info().unwrap();
    (pixels, info.width, info.height)
}

// ============================================================================
// Fixtures
// ============================================================================

#[test]
fn test_gray_16x16_scan_fixture() {
    let image = RgbImage::new(16, 16, [128, 128, 128]).unwrap();
    let encoded = Encoder::new().analyze(&image).unwrap();

    // Every coefficient of every block quantizes to zero
    assert!(encoded.coefficients.as_slice().iter().all(|&c| c == 0));
    assert!(encoded.tokens.iter().all(|t| t == &[RleToken::EOB]));

    // Per spatial block: Y (DC cat 0 "00", EOB "1010"), then Cb and Cr
    // (DC cat 0 "00", EOB "00")
    let expected = ["001010", "0000", "0000"].concat().repeat(4);
    assert_eq!(encoded.scan.to_bit_string(), expected);
    assert_eq!(
        encoded.scan.bytes,
        vec![0x28, 0x00, 0xA0, 0x02, 0x80, 0x0A, 0x00]
    );

    let jpeg = Encoder::new().encode_image(&image).unwrap();
    assert_eq!(jpeg.len(), 649);
    let start = scan_start(&jpeg);
    assert_eq!(start, 640);
    assert_eq!(&jpeg[start..jpeg.len() - 2], &encoded.scan.bytes[..]);
}

#[test]
fn test_single_white_pixel_compresses() {
    let mut image = RgbImage::new(8, 8, [0, 0, 0]).unwrap();
    *image.get_mut(0, 0).unwrap() = [255, 255, 255];
    let encoded = Encoder::new().analyze(&image).unwrap();

    let y_row = encoded.coefficients.row_index(0, Channel::Y);
    let y_tokens = &encoded.tokens[y_row];
    assert_eq!(encoded.coefficients.row(y_row)[0], -62);
    assert_eq!(y_tokens.len(), 30);
    assert_eq!(y_tokens.last(), Some(&RleToken::EOB));

    // Chroma of pure white and pure black is neutral
    for channel in [Channel::Cb, Channel::Cr] {
        let row = encoded.coefficients.row_index(0, channel);
        assert_eq!(encoded.tokens[row], vec![RleToken::EOB]);
    }
}

#[test]
fn test_header_layout() {
    let image = RgbImage::new(16, 8, [10, 20, 30]).unwrap();
    let jpeg = Encoder::new().comment("hi").encode_image(&image).unwrap();

    let mut expected = vec![0xFF, 0xD8];
    expected.extend_from_slice(&[
        0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x01, 0x00, 0x48,
        0x00, 0x48, 0x00, 0x00,
    ]);
    expected.extend_from_slice(&[0xFF, 0xFE, 0x00, 0x04, b'h', b'i']);
    for (id, table) in [(0u8, QuantTable::std_luma()), (1, QuantTable::std_chroma())] {
        expected.extend_from_slice(&[0xFF, 0xDB, 0x00, 0x43, id]);
        expected.extend_from_slice(&table.to_zigzag());
    }
    expected.extend_from_slice(&[
        0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0x08, 0x00, 0x10, 0x03, 0x01, 0x11, 0x00, 0x02,
        0x11, 0x01, 0x03, 0x11, 0x01,
    ]);
    let dht: [(u8, &[u8; 17], &[u8]); 4] = [
        (0x00, &DC_LUMINANCE_BITS, &DC_LUMINANCE_VALUES),
        (0x10, &AC_LUMINANCE_BITS, &AC_LUMINANCE_VALUES),
        (0x01, &DC_CHROMINANCE_BITS, &DC_CHROMINANCE_VALUES),
        (0x11, &AC_CHROMINANCE_BITS, &AC_CHROMINANCE_VALUES),
    ];
    for (tc_th, bits, values) in dht {
        let len = (2 + 1 + 16 + values.len()) as u16;
        expected.extend_from_slice(&[0xFF, 0xC4]);
        expected.extend_from_slice(&len.to_be_bytes());
        expected.push(tc_th);
        expected.extend_from_slice(&bits[1..]);
        expected.extend_from_slice(values);
    }
    expected.extend_from_slice(&[
        0xFF, 0xDA, 0x00, 0x0C, 0x03, 0x01, 0x00, 0x02, 0x11, 0x03, 0x11, 0x00, 0x3F, 0x00,
    ]);

    assert_eq!(&jpeg[..expected.len()], &expected[..]);
    assert_eq!(scan_start(&jpeg), expected.len());
}

#[test]
fn test_no_comment_segment() {
    let image = RgbImage::new(8, 8, [0, 0, 0]).unwrap();
    let with = Encoder::new().encode_image(&image).unwrap();
    let without = Encoder::new().no_comment().encode_image(&image).unwrap();
    assert_eq!(with.len() - without.len(), 4 + "baseline-jpeg".len());
    assert_eq!(&without[20..22], &[0xFF, 0xDB]);
}

// ============================================================================
// File format
// ============================================================================

#[test]
fn test_soi_eoi_and_stuffing() {
    let (width, height) = (40, 24);
    let rgb = noise(width * height * 3, 7);
    let encoder = Encoder::new().quality(95);
    let jpeg = encoder.encode_rgb(&rgb, width, height).unwrap();

    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    assert_eq!(&jpeg[jpeg.len() - 2..], &[0xFF, 0xD9]);

    let scan = &jpeg[scan_start(&jpeg)..jpeg.len() - 2];
    let mut i = 0;
    while i < scan.len() {
        if scan[i] == 0xFF {
            assert_eq!(scan.get(i + 1), Some(&0x00), "unstuffed 0xFF at {i}");
            i += 1;
        }
        i += 1;
    }

    let packed = encoder
        .analyze(&RgbImage::from_rgb_bytes(&rgb, width, height).unwrap())
        .unwrap()
        .scan;
    let ff_count = packed.bytes.iter().filter(|&&b| b == 0xFF).count();
    assert!(ff_count > 0, "noise should produce 0xFF scan bytes");
    assert_eq!(scan.len(), packed.bytes.len() + ff_count);
}

#[test]
fn test_scan_tail_padded_with_ones() {
    // 8x8 gray: "001010" + "0000" + "0000" = 14 bits, 2 pad bits
    let image = RgbImage::new(8, 8, [128, 128, 128]).unwrap();
    let scan = Encoder::new().analyze(&image).unwrap().scan;
    assert_eq!(scan.bit_len, 14);
    assert_eq!(scan.bytes, vec![0b0010_1000, 0b0000_0011]);
}

// ============================================================================
// Decoding
// ============================================================================

#[test]
fn test_decode_gray() {
    let image = RgbImage::new(16, 16, [128, 128, 128]).unwrap();
    let jpeg = Encoder::new().encode_image(&image).unwrap();
    let (pixels, width, height) = decode(&jpeg);
    assert_eq!((width, height), (16, 16));
    assert!(pixels.iter().all(|&p| p.abs_diff(128) <= 1));
}

#[test]
fn test_decode_with_jpeg_decoder() {
    let (width, height) = (32, 32);
    let rgb = gradient(width, height);
    let jpeg = Encoder::new().encode_rgb(&rgb, width, height).unwrap();

    let (decoded, w, h) = decode(&jpeg);
    assert_eq!((w as usize, h as usize), (width, height));
    assert_eq!(decoded.len(), rgb.len());

    let total: u64 = decoded
        .iter()
        .zip(&rgb)
        .map(|(&a, &b)| a.abs_diff(b) as u64)
        .sum();
    let mean = total as f64 / rgb.len() as f64;
    assert!(mean < 10.0, "mean abs error {mean}");
}

#[test]
fn test_decode_odd_dimensions() {
    let (width, height) = (13, 7);
    let rgb = noise(width * height * 3, 3);
    for subsample in [true, false] {
        let jpeg = Encoder::new()
            .subsample_chroma(subsample)
            .encode_rgb(&rgb, width, height)
            .unwrap();
        let (decoded, w, h) = decode(&jpeg);
        assert_eq!((w, h), (13, 7));
        assert_eq!(decoded.len(), rgb.len());
    }
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_backends_produce_identical_files() {
    let (width, height) = (37, 23);
    let rgb = noise(width * height * 3, 11);
    for subsample in [true, false] {
        let seq = Encoder::new()
            .subsample_chroma(subsample)
            .backend(Backend::Sequential)
            .encode_rgb(&rgb, width, height)
            .unwrap();
        let par = Encoder::new()
            .subsample_chroma(subsample)
            .backend(Backend::Parallel)
            .encode_rgb(&rgb, width, height)
            .unwrap();
        assert_eq!(seq, par);
    }
}

#[test]
fn test_custom_tables_are_written() {
    let image = RgbImage::from_rgb_bytes(&gradient(16, 16), 16, 16).unwrap();
    let jpeg = Encoder::new()
        .no_comment()
        .luma_qtable([2; 64])
        .chroma_qtable([3; 64])
        .encode_image(&image)
        .unwrap();
    // SOI (2) + APP0 (18), then DQT luma
    assert_eq!(&jpeg[20..25], &[0xFF, 0xDB, 0x00, 0x43, 0x00]);
    assert!(jpeg[25..89].iter().all(|&v| v == 2));
    assert_eq!(jpeg[93], 0x01);
    assert!(jpeg[94..158].iter().all(|&v| v == 3));
}

#[test]
fn test_finer_tables_grow_the_file() {
    let (width, height) = (32, 32);
    let rgb = gradient(width, height);
    let coarse = Encoder::new()
        .quality(20)
        .encode_rgb(&rgb, width, height)
        .unwrap();
    let fine = Encoder::new()
        .quality(95)
        .encode_rgb(&rgb, width, height)
        .unwrap();
    assert!(fine.len() > coarse.len());
}

#[test]
fn test_subsampling_changes_chroma_only() {
    let image = RgbImage::from_rgb_bytes(&noise(16 * 16 * 3, 5), 16, 16).unwrap();
    let on = Encoder::new().analyze(&image).unwrap();
    let off = Encoder::new().subsample_chroma(false).analyze(&image).unwrap();
    for block in 0..on.coefficients.rows_per_channel() {
        let y = on.coefficients.row_index(block, Channel::Y);
        assert_eq!(on.coefficients.row(y), off.coefficients.row(y));
    }
    assert_ne!(on.coefficients, off.coefficients);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_invalid_dimensions() {
    let encoder = Encoder::new();
    assert!(matches!(
        encoder.encode_rgb(&[], 0, 0),
        Err(Error::InvalidDimensions { .. })
    ));
    assert!(matches!(
        encoder.encode_rgb(&[], 0, 16),
        Err(Error::InvalidDimensions { .. })
    ));
    assert!(matches!(
        encoder.encode_rgb(&[], 65536, 1),
        Err(Error::InvalidDimensions {
            width: 65536,
            height: 1
        })
    ));
    let empty = RgbImage::new(0, 5, [0, 0, 0]).unwrap();
    assert!(matches!(
        encoder.encode_image(&empty),
        Err(Error::InvalidDimensions { .. })
    ));
}

#[test]
fn test_buffer_size_mismatch() {
    assert!(matches!(
        Encoder::new().encode_rgb(&[0; 10], 2, 2),
        Err(Error::BufferSizeMismatch {
            expected: 12,
            actual: 10
        })
    ));
}

#[test]
fn test_failed_encode_writes_nothing() {
    let mut out = Vec::new();
    let result = Encoder::new()
        .quality(0)
        .encode_rgb_to_writer(&[0; 12], 2, 2, &mut out);
    assert!(matches!(result, Err(Error::InvalidQuality(0))));
    assert!(out.is_empty());

    Encoder::new()
        .encode_rgb_to_writer(&[0; 12], 2, 2, &mut out)
        .unwrap();
    assert_eq!(&out[..2], &[0xFF, 0xD8]);
}

#[test]
fn test_io_error_propagates() {
    struct Broken;
    impl std::io::Write for Broken {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("sink closed"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
    let result = Encoder::new().encode_rgb_to_writer(&[0; 12], 2, 2, Broken);
    assert!(matches!(result, Err(Error::Io(_))));
}
