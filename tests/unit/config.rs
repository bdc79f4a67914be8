use super::*;

#[test]
fn defaults_match_sticker_requirements() {
    let cfg = ConversionConfig::default();
    assert_eq!(cfg.max_bytes, 5_242_880);
    assert_eq!((cfg.required_width, cfg.required_height), (512, 512));
    assert_eq!(cfg.frame_rate, 60);
    assert_eq!(cfg.sticker_size_limit, 65_536);
    cfg.validate().unwrap();
}

#[test]
fn validation_catches_bad_values() {
    let base = ConversionConfig::default();

    assert!(
        ConversionConfig {
            required_width: 0,
            ..base.clone()
        }
        .validate()
        .is_err()
    );
    assert!(
        ConversionConfig {
            frame_rate: 0,
            ..base.clone()
        }
        .validate()
        .is_err()
    );
    assert!(
        ConversionConfig {
            duration_frames: 0,
            ..base.clone()
        }
        .validate()
        .is_err()
    );
    assert!(
        ConversionConfig {
            compression_level: 10,
            ..base
        }
        .validate()
        .is_err()
    );
}

#[test]
fn required_size_is_capped_at_the_largest_canvas() {
    let at_cap = ConversionConfig {
        required_width: MAX_CANVAS_DIM,
        required_height: MAX_CANVAS_DIM,
        ..ConversionConfig::default()
    };
    at_cap.validate().unwrap();

    let err = ConversionConfig {
        required_width: MAX_CANVAS_DIM + 1,
        ..ConversionConfig::default()
    }
    .validate()
    .unwrap_err();
    assert!(matches!(err, ConvertError::Config(_)), "{err:?}");

    let err = ConversionConfig::from_json(r#"{"required_height": 20000}"#).unwrap_err();
    assert!(err.to_string().contains("exceeds"), "{err}");
}

#[test]
fn json_fills_missing_fields_with_defaults() {
    let cfg = ConversionConfig::from_json(r#"{"required_width": 100, "frame_rate": 30}"#).unwrap();
    assert_eq!(cfg.required_width, 100);
    assert_eq!(cfg.required_height, 512);
    assert_eq!(cfg.frame_rate, 30);
    assert_eq!(cfg.compression_level, 9);
}

#[test]
fn json_rejects_unknown_and_invalid() {
    let err = ConversionConfig::from_json(r#"{"bot_token": "x"}"#).unwrap_err();
    assert!(err.to_string().contains("serialization error:"));

    let err = ConversionConfig::from_json(r#"{"duration_frames": 0}"#).unwrap_err();
    assert!(err.to_string().contains("config error:"));
}
