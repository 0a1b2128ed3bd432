//! Half-Float Packer Tests
//!
//! Tests for:
//! - pack: half and full precision paths from half and single input
//! - Precision contract: round-trip error within 2⁻¹¹ relative
//! - Non-destructive packing, overflow rejection
//! - AnimationSampleBuffer: constructors, readback, fingerprints

use half::f16;

use myth_vat::packer::{self, HALF_EPSILON, PackedTexels, PixelPrecision};
use myth_vat::samples::AnimationSampleBuffer;
use myth_vat::VatError;

fn within_half_epsilon(original: f32, packed: f32) -> bool {
    if original == 0.0 {
        return packed == 0.0;
    }
    ((packed - original) / original).abs() <= HALF_EPSILON
}

// ============================================================================
// Formats
// ============================================================================

#[test]
fn precision_selects_texture_format() {
    assert_eq!(
        PixelPrecision::Half.texture_format(),
        wgpu::TextureFormat::Rgba16Float
    );
    assert_eq!(
        PixelPrecision::Full.texture_format(),
        wgpu::TextureFormat::Rgba32Float
    );
    assert_eq!(PixelPrecision::default(), PixelPrecision::Half);
}

#[test]
fn fallback_swaps_precision() {
    assert_eq!(PixelPrecision::Half.fallback(), PixelPrecision::Full);
    assert_eq!(PixelPrecision::Full.fallback(), PixelPrecision::Half);
}

// ============================================================================
// Packing
// ============================================================================

#[test]
fn half_input_packs_to_identical_half_bits() {
    let bits: Vec<u16> = vec![0x3C00, 0xC000, 0x0000, 0x7BFF];
    let samples = AnimationSampleBuffer::from_half_bits(&bits);
    let packed = packer::pack(&samples, PixelPrecision::Half).unwrap();

    let PackedTexels::Half(values) = &packed else {
        panic!("expected half texels");
    };
    let packed_bits: Vec<u16> = values.iter().map(|h| h.to_bits()).collect();
    assert_eq!(packed_bits, bits);
    assert_eq!(packed.as_bytes().len(), bits.len() * 2);
}

#[test]
fn single_input_round_trips_within_half_epsilon() {
    let originals = vec![
        0.0f32, 1.0, -1.0, 0.5, 0.707_106_77, -0.333_333_34, 3.141_592_7, 12.345, -150.75,
        1024.5, 0.001_234,
    ];
    let samples = AnimationSampleBuffer::from_f32(originals.clone());
    let packed = packer::pack(&samples, PixelPrecision::Half).unwrap();

    assert_eq!(packed.precision(), PixelPrecision::Half);
    assert_eq!(packed.len(), originals.len());
    for (i, &original) in originals.iter().enumerate() {
        let value = packed.get(i).unwrap();
        assert!(
            within_half_epsilon(original, value),
            "{original} packed to {value}"
        );
    }
}

#[test]
fn full_precision_keeps_single_values() {
    let originals = vec![0.1f32, 0.2, 0.3, 1.0e-7];
    let samples = AnimationSampleBuffer::from_f32(originals.clone());
    let packed = packer::pack(&samples, PixelPrecision::Full).unwrap();

    assert_eq!(packed, PackedTexels::Full(originals));
    assert_eq!(packed.as_bytes().len(), 16);
}

#[test]
fn half_input_widens_exactly_to_full() {
    let halves = vec![f16::from_f32(0.25), f16::from_f32(-7.5)];
    let samples = AnimationSampleBuffer::from_half(halves);
    let packed = packer::pack(&samples, PixelPrecision::Full).unwrap();
    assert_eq!(packed, PackedTexels::Full(vec![0.25, -7.5]));
}

#[test]
fn packing_does_not_mutate_source() {
    let samples = AnimationSampleBuffer::from_f32(vec![0.1, 0.2, 0.3]);
    let before = samples.clone();
    let _ = packer::pack(&samples, PixelPrecision::Half).unwrap();
    assert_eq!(samples, before);
    assert_eq!(samples.get(0), Some(0.1));
}

#[test]
fn overflowing_sample_is_rejected() {
    let samples = AnimationSampleBuffer::from_f32(vec![1.0, 2.0, 70_000.0]);
    let err = packer::pack(&samples, PixelPrecision::Half).unwrap_err();
    assert_eq!(
        err,
        VatError::NonFiniteSample {
            index: 2,
            value: 70_000.0
        }
    );
    // Same data is fine at full precision.
    assert!(packer::pack(&samples, PixelPrecision::Full).is_ok());
}

// ============================================================================
// Sample Buffer
// ============================================================================

#[test]
fn buffer_reports_length_and_kind() {
    let half = AnimationSampleBuffer::from_half(vec![f16::ZERO; 8]);
    assert_eq!(half.len(), 8);
    assert!(half.is_half());
    assert!(!half.is_empty());

    let single = AnimationSampleBuffer::from_f32(Vec::new());
    assert!(single.is_empty());
    assert!(!single.is_half());
    assert_eq!(single.get(0), None);
}

#[test]
fn fingerprint_tracks_content() {
    let a = AnimationSampleBuffer::from_f32(vec![1.0, 2.0, 3.0, 4.0]);
    let b = AnimationSampleBuffer::from_f32(vec![1.0, 2.0, 3.0, 4.0]);
    let c = AnimationSampleBuffer::from_f32(vec![1.0, 2.0, 3.0, 5.0]);
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_ne!(a.fingerprint(), c.fingerprint());
}

#[test]
fn fingerprint_distinguishes_precision() {
    // 0.0f32 is four zero bytes, two zero halves are also four zero bytes.
    let single = AnimationSampleBuffer::from_f32(vec![0.0]);
    let half = AnimationSampleBuffer::from_half(vec![f16::ZERO; 2]);
    assert_eq!(single.as_bytes(), half.as_bytes());
    assert_ne!(single.fingerprint(), half.fingerprint());
}
