//! Tests for parsing augmentation pipeline configurations
//!
//! This module covers the TOML surface of the pipeline configuration: stage keys,
//! gate and factor forms, required worker parameters and fail-fast rejection.

use steprec_config::*;

#[cfg(test)]
mod test_stage_parsing {
    use super::*;

    //region Helper Functions

    fn parse(content: &str) -> ConfigResult<SteprecConfig> {
        load_config_from_str(content)
    }

    //endregion

    #[test]
    fn test_empty_document_uses_standard_stages() {
        let config = parse("").unwrap();
        let stages = &config.augmentation.stages;
        assert!(stages.flip.is_none());
        assert_eq!(stages.flip_or_standard(), FlipStageConfig::standard());
        assert_eq!(stages.color_or_standard().posterize, None);
        assert_eq!(stages.perspective_or_standard().distortion.resolved_size(), 8);
        assert_eq!(stages.mask_or_standard().center.resolved_size(), 2);
    }

    #[test]
    fn test_full_stage_table() {
        let config = parse(
            r#"
            [augmentation]
            seed = 7
            input_size = 600
            reverse_channels = true

            [augmentation.stages.flip]
            enabled = "coin"
            blend = { fixed = 0.5 }

            [augmentation.stages.perspective]
            enabled = 0.25
            distortion = { min = 0.0, max = 0.9, step = 0.025, size = 8 }

            [augmentation.stages.color]
            brightness = { drift = { min = 0.7, max = 1.5, step = 0.05 } }
            hue = { uniform = { min = -0.05, max = 0.05 } }
            posterize = { fixed = 6.0 }

            [augmentation.stages.salt_pepper]
            enabled = false
            ratio = { drift = { min = 900.0, max = 1000.0, step = 10.0 } }

            [augmentation.stages.mask]
            enabled = true
            patch_size = { min = 0.0, max = 3.0, step = 1.0 }
            center = { min = [0.0, 10.0], max = [224.0, 200.0], step = 1.0 }
            "#,
        )
        .unwrap();

        let augmentation = &config.augmentation;
        assert_eq!(augmentation.seed, Some(7));
        assert_eq!(augmentation.input_size, Some(600));
        assert!(augmentation.reverse_channels);

        let flip = augmentation.stages.flip.as_ref().unwrap();
        assert_eq!(flip.enabled, Some(GateSpec::Keyword(GateKeyword::Coin)));
        assert_eq!(flip.blend, Some(FactorSpec::Fixed(0.5)));

        let perspective = augmentation.stages.perspective.as_ref().unwrap();
        assert_eq!(perspective.enabled, Some(GateSpec::Probability(0.25)));

        let color = augmentation.stages.color.as_ref().unwrap();
        assert_eq!(color.brightness, Some(FactorSpec::drift(0.7, 1.5, 0.05)));
        assert_eq!(color.hue, Some(FactorSpec::Uniform { min: -0.05, max: 0.05 }));
        assert!(color.contrast.is_none());

        let salt = augmentation.stages.salt_pepper.as_ref().unwrap();
        assert_eq!(salt.enabled, Some(GateSpec::Flag(false)));

        let mask = augmentation.stages.mask.as_ref().unwrap();
        assert_eq!(mask.center.resolved_size(), 2);
        assert_eq!(mask.center.min, ScalarOrVector::Vector(vec![0.0, 10.0]));
    }

    #[test]
    fn test_unknown_stage_key_rejected() {
        let result = parse(
            r#"
            [augmentation.stages.rotate]
            enabled = true
            "#,
        );
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_unknown_worker_parameter_rejected() {
        let result = parse(
            r#"
            [augmentation.stages.flip]
            enabled = true
            angle = 3.0
            "#,
        );
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_missing_required_worker_parameter_rejected() {
        let result = parse(
            r#"
            [augmentation.stages.perspective]
            enabled = true
            "#,
        );
        assert!(matches!(result, Err(ConfigError::ParseError(_))));

        let result = parse(
            r#"
            [augmentation.stages.mask]
            patch_size = { min = 0.0, max = 3.0, step = 1.0 }
            "#,
        );
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let result = parse(
            r#"
            [augmentation.stages.salt_pepper]
            enabled = 2.0
            ratio = { fixed = 1000.0 }
            "#,
        );
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}

#[cfg(test)]
mod test_serialization {
    use super::*;

    #[test]
    fn test_standard_config_survives_json() {
        let mut config = SteprecConfig::default();
        config.augmentation.stages.color = Some(ColorStageConfig::standard());
        config.augmentation.stages.mask = Some(MaskStageConfig::standard());

        let json = serde_json::to_string(&config).unwrap();
        let back: SteprecConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(back.augmentation.stages.color, config.augmentation.stages.color);
        assert_eq!(back.augmentation.stages.mask, config.augmentation.stages.mask);
        assert!(validate_config(&back).is_ok());
    }
}
