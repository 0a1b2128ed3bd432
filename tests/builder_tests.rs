//! Texture Builder Tests
//!
//! Tests for:
//! - VatTextureBuilder: layout validation before allocation, sampling policy
//! - Naming: deterministic resource names and skeleton identities
//! - Precision fallback and device limits
//! - Allocation descriptors: format and row size follow the precision
//! - Readback of bone transforms through the sampling contract
//! - VatSettings / SkeletonDescriptor serde

use glam::{Mat4, Quat, Vec3};

use myth_vat::builder::{VatTextureBuilder, resource_name};
use myth_vat::layout::TextureLayout;
use myth_vat::samples::{AnimationSampleBuffer, SampleRecorder};
use myth_vat::sink::{HeadlessTextureSink, TextureSink};
use myth_vat::texture::VatTextureDescriptor;
use myth_vat::{
    BoneDescriptor, PixelPrecision, SkeletonDescriptor, VatError, VatSamplingPolicy, VatSettings,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn skeleton(bone_count: usize) -> SkeletonDescriptor {
    SkeletonDescriptor::from_bone_names("Hero", (0..bone_count).map(|i| format!("bone_{i}")))
}

fn zero_samples(bone_count: usize, frames: usize) -> AnimationSampleBuffer {
    AnimationSampleBuffer::from_f32(vec![0.0; (bone_count + 1) * 16 * frames])
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn builds_24_bone_10_frame_texture() {
    init_logger();
    let sink = HeadlessTextureSink::new();
    let settings = VatSettings::default();
    let builder = VatTextureBuilder::new(&sink, &settings);

    let vat = builder
        .build(Some(&skeleton(24)), &zero_samples(24, 10))
        .unwrap();

    assert_eq!(vat.layout().width, 100);
    assert_eq!(vat.layout().height, 10);
    assert_eq!(vat.format(), wgpu::TextureFormat::Rgba16Float);
    assert_eq!(sink.allocation_count(), 1);

    let texture = sink.texture(vat.handle()).unwrap();
    assert_eq!((texture.width, texture.height), (100, 10));
    assert_eq!(texture.data.len(), 100 * 10 * 8);
    assert_eq!(texture.label.as_deref(), Some("VAT_Hero"));
}

#[test]
fn missing_skeleton_fails_without_allocating() {
    let sink = HeadlessTextureSink::new();
    let settings = VatSettings::default();
    let builder = VatTextureBuilder::new(&sink, &settings);

    let err = builder.build(None, &zero_samples(24, 10)).unwrap_err();
    assert_eq!(err, VatError::MissingSkeleton);
    assert_eq!(sink.allocation_count(), 0);
}

#[test]
fn short_buffer_fails_without_allocating() {
    let sink = HeadlessTextureSink::new();
    let settings = VatSettings::default();
    let builder = VatTextureBuilder::new(&sink, &settings);

    let samples = AnimationSampleBuffer::from_f32(vec![0.0; 3999]);
    let err = builder.build(Some(&skeleton(24)), &samples).unwrap_err();
    assert!(matches!(err, VatError::InvalidLayout { buffer_len: 3999, .. }));
    assert_eq!(sink.allocation_count(), 0);
}

#[test]
fn layout_is_available_without_a_sink() {
    let layout = VatTextureBuilder::layout(Some(&skeleton(24)), &zero_samples(24, 10)).unwrap();
    assert_eq!((layout.width, layout.height), (100, 10));
    assert_eq!(
        VatTextureBuilder::layout(None, &zero_samples(24, 10)),
        Err(VatError::MissingSkeleton)
    );
}

// ============================================================================
// Sampling Policy
// ============================================================================

#[test]
fn policy_is_nearest_without_mipmaps_or_flip() {
    let policy = VatSamplingPolicy::POLICY;
    assert_eq!(policy.mag_filter(), wgpu::FilterMode::Nearest);
    assert_eq!(policy.min_filter(), wgpu::FilterMode::Nearest);
    assert_eq!(policy.mipmap_filter(), wgpu::MipmapFilterMode::Nearest);
    assert_eq!(policy.mip_level_count(), 1);
    assert!(!policy.generates_mipmaps());
    assert!(!policy.flip_y());

    let desc = policy.sampler_descriptor(Some("vat"));
    assert_eq!(desc.mag_filter, wgpu::FilterMode::Nearest);
    assert_eq!(desc.min_filter, wgpu::FilterMode::Nearest);
    assert_eq!(desc.mipmap_filter, wgpu::MipmapFilterMode::Nearest);
}

#[test]
fn allocated_texture_carries_policy() {
    let sink = HeadlessTextureSink::new();
    let settings = VatSettings {
        precision: PixelPrecision::Full,
        ..Default::default()
    };
    let vat = VatTextureBuilder::new(&sink, &settings)
        .build(Some(&skeleton(2)), &zero_samples(2, 3))
        .unwrap();

    let texture = sink.texture(vat.handle()).unwrap();
    assert_eq!(texture.sampling, VatSamplingPolicy::POLICY);
    assert_eq!(vat.sampling(), VatSamplingPolicy::POLICY);
    assert_eq!(texture.format, wgpu::TextureFormat::Rgba32Float);
}

// ============================================================================
// Naming
// ============================================================================

#[test]
fn resource_name_is_prefix_plus_skeleton_name() {
    let skeleton = SkeletonDescriptor::from_bone_names("Orc_Grunt", ["root"]);
    assert_eq!(resource_name("VAT_", &skeleton), "VAT_Orc_Grunt");
    assert_eq!(resource_name("crowd/", &skeleton), "crowd/Orc_Grunt");
}

#[test]
fn skeleton_identity_is_deterministic() {
    let a = SkeletonDescriptor::from_bone_names("Orc", ["root", "spine"]);
    let b = SkeletonDescriptor::new("Orc", vec![BoneDescriptor::new("root")]);
    let c = SkeletonDescriptor::from_bone_names("Elf", ["root", "spine"]);
    assert_eq!(a.id(), b.id());
    assert_ne!(a.id(), c.id());
    assert_eq!(a.id(), SkeletonDescriptor::identity_for("Orc"));
}

#[test]
fn unlabelled_textures_when_disabled() {
    let sink = HeadlessTextureSink::new();
    let settings = VatSettings {
        label_textures: false,
        ..Default::default()
    };
    let vat = VatTextureBuilder::new(&sink, &settings)
        .build(Some(&skeleton(1)), &zero_samples(1, 1))
        .unwrap();
    assert_eq!(vat.name(), "VAT_Hero");
    assert!(sink.texture(vat.handle()).unwrap().label.is_none());
}

#[test]
fn descriptor_row_size_follows_precision() {
    let layout = TextureLayout::compute(24, 4000).unwrap();
    let mut desc = VatTextureDescriptor {
        label: None,
        layout,
        precision: PixelPrecision::Half,
        sampling: VatSamplingPolicy::POLICY,
    };
    assert_eq!(desc.format(), wgpu::TextureFormat::Rgba16Float);
    assert_eq!(desc.bytes_per_row(), 100 * 8);

    desc.precision = PixelPrecision::Full;
    assert_eq!(desc.format(), wgpu::TextureFormat::Rgba32Float);
    assert_eq!(desc.bytes_per_row(), 100 * 16);
}

// ============================================================================
// Device Capabilities
// ============================================================================

#[test]
fn falls_back_to_full_precision_when_half_unsupported() {
    init_logger();
    let sink = HeadlessTextureSink::new().without_format(wgpu::TextureFormat::Rgba16Float);
    let settings = VatSettings::default();
    let vat = VatTextureBuilder::new(&sink, &settings)
        .build(Some(&skeleton(2)), &zero_samples(2, 2))
        .unwrap();
    assert_eq!(vat.precision(), PixelPrecision::Full);
    assert_eq!(sink.texture(vat.handle()).unwrap().data.len(), 12 * 2 * 16);
}

#[test]
fn unsupported_format_without_fallback_fails() {
    let sink = HeadlessTextureSink::new().without_format(wgpu::TextureFormat::Rgba16Float);
    let settings = VatSettings {
        allow_precision_fallback: false,
        ..Default::default()
    };
    let err = VatTextureBuilder::new(&sink, &settings)
        .build(Some(&skeleton(2)), &zero_samples(2, 2))
        .unwrap_err();
    assert_eq!(
        err,
        VatError::UnsupportedFormat(wgpu::TextureFormat::Rgba16Float)
    );
    assert_eq!(sink.allocation_count(), 0);
}

#[test]
fn oversized_texture_exceeds_device_limit() {
    let sink = HeadlessTextureSink::new().with_max_dimension(64);
    assert_eq!(sink.max_texture_dimension(), 64);
    let settings = VatSettings::default();

    // 24 bones -> 100 texels wide.
    let err = VatTextureBuilder::new(&sink, &settings)
        .build(Some(&skeleton(24)), &zero_samples(24, 1))
        .unwrap_err();
    assert_eq!(
        err,
        VatError::ExceedsDeviceLimit {
            width: 100,
            height: 1,
            max: 64
        }
    );
    assert_eq!(sink.allocation_count(), 0);
}

// ============================================================================
// Sampling Contract Readback
// ============================================================================

#[test]
fn bone_transform_reads_back_recorded_matrix() {
    let bones = 3;
    let frames = 5;
    let mut recorder = SampleRecorder::new(bones);
    let mut expected = Vec::new();
    for f in 0..frames {
        let t = f as f32 * 0.25;
        let joints: Vec<Mat4> = (0..bones)
            .map(|b| {
                Mat4::from_scale_rotation_translation(
                    Vec3::ONE,
                    Quat::from_rotation_y(t + b as f32),
                    Vec3::new(b as f32, t, -t),
                )
            })
            .collect();
        recorder
            .push_frame(&joints, Mat4::from_translation(Vec3::Y * t))
            .unwrap();
        expected.push(joints);
    }

    let sink = HeadlessTextureSink::new();
    let settings = VatSettings::default();
    let vat = VatTextureBuilder::new(&sink, &settings)
        .build(Some(&skeleton(bones)), &recorder.finish())
        .unwrap();

    for (f, joints) in expected.iter().enumerate() {
        for (b, joint) in joints.iter().enumerate() {
            let read = vat.bone_transform(f as u32, b).unwrap();
            assert!(
                read.abs_diff_eq(*joint, 4.0e-3),
                "frame {f} bone {b}: {read:?} != {joint:?}"
            );
        }
        let root = vat.root_transform(f as u32).unwrap();
        assert!(root.abs_diff_eq(Mat4::from_translation(Vec3::Y * f as f32 * 0.25), 4.0e-3));
    }
    assert!(vat.bone_transform(frames as u32, 0).is_none());
}

// ============================================================================
// Serde
// ============================================================================

#[test]
fn settings_deserialize_with_defaults() {
    let settings: VatSettings = serde_json::from_str(r#"{ "precision": "full" }"#).unwrap();
    assert_eq!(settings.precision, PixelPrecision::Full);
    assert_eq!(settings.name_prefix, "VAT_");
    assert!(settings.allow_precision_fallback);
}

#[test]
fn skeleton_identity_survives_serde() {
    let skeleton = SkeletonDescriptor::new(
        "Hero",
        vec![BoneDescriptor::new("hips"), BoneDescriptor::new("spine").with_parent(0)],
    );
    let json = serde_json::to_string(&skeleton).unwrap();
    let decoded: SkeletonDescriptor = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, skeleton);
    assert_eq!(decoded.bone_index("spine"), Some(1));
    assert_eq!(decoded.bones()[1].parent, Some(0));
}
