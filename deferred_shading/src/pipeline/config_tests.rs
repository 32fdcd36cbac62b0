/// Tests for PipelineConfig defaults and builders

use super::*;

#[test]
fn test_default_config() {
    let config = PipelineConfig::default();

    assert_eq!(config.gbuffer_format, TextureFormat::R16G16B16A16_SFLOAT);
    assert_eq!(config.result_format, TextureFormat::R8G8B8A8_UNORM);
    assert!(config.depth_format.is_depth());
    assert_eq!(config.filter, FilterMode::Point);
    assert_eq!(config.depth_sharing, DepthSharing::SharedWithResult);
    assert!(!config.debug_overlay);
}

#[test]
fn test_default_clear_is_opaque_black_far_depth() {
    let clear = ClearConfig::default();

    assert_eq!(clear.color, [0.0, 0.0, 0.0, 1.0]);
    assert_eq!(clear.depth, 1.0);
    assert!(clear.clear_color && clear.clear_depth);
}

#[test]
fn test_builders() {
    let config = PipelineConfig::default()
        .with_debug_overlay(true)
        .with_depth_sharing(DepthSharing::Separate);

    assert!(config.debug_overlay);
    assert_eq!(config.depth_sharing, DepthSharing::Separate);
    assert_eq!(config.gbuffer_format, PipelineConfig::default().gbuffer_format);
}
