//! Tests for config module

#[cfg(test)]
mod tests {
    use crate::config::*;
    use crate::disk::DiskSpaceGuard;
    use crate::format::StoreFormat;
    use serial_test::serial;

    // ========================================================================
    // Defaults
    // ========================================================================

    #[test]
    fn test_config_default_values() {
        // Arrange & Act
        let config = FlatvecConfig::default();

        // Assert
        assert!(config.disk.min_free_space.is_none());
        assert_eq!(config.disk.low_space_warning, "5GB");
        assert!(config.disk.preflight);
        assert_eq!(config.storage.default_format, StoreFormat::Binary);
        assert_eq!(config.storage.read_buffer_size, 64 * 1024);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_default_validates() {
        assert!(FlatvecConfig::default().validate().is_ok());
    }

    // ========================================================================
    // TOML parsing
    // ========================================================================

    #[test]
    fn test_config_from_toml_minimal() {
        // Arrange
        let toml_str = r#"
[disk]
min_free_space = "100gb"
"#;

        // Act
        let config = FlatvecConfig::from_toml(toml_str).expect("parse");

        // Assert
        assert_eq!(config.disk.min_free_space.as_deref(), Some("100gb"));
        assert_eq!(config.storage.read_buffer_size, 64 * 1024);
    }

    #[test]
    fn test_config_from_toml_full() {
        // Arrange
        let toml_str = r#"
[disk]
min_free_space = "10.5mb"
low_space_warning = "1GB"
preflight = false

[storage]
default_format = "text"
read_buffer_size = 4096

[logging]
level = "debug"
with_target = true
"#;

        // Act
        let config = FlatvecConfig::from_toml(toml_str).expect("parse");

        // Assert
        assert_eq!(config.disk.low_space_warning, "1GB");
        assert!(!config.disk.preflight);
        assert_eq!(config.storage.default_format, StoreFormat::Text);
        assert_eq!(config.storage.read_buffer_size, 4096);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.with_target);
    }

    #[test]
    fn test_config_from_toml_invalid_format() {
        let toml_str = r#"
[storage]
default_format = "parquet"
"#;
        assert!(FlatvecConfig::from_toml(toml_str).is_err());
    }

    // ========================================================================
    // Validation
    // ========================================================================

    #[test]
    fn test_config_validate_invalid_log_level() {
        let mut config = FlatvecConfig::default();
        config.logging.level = "verbose".to_string();

        let err = config.validate().expect_err("should fail");
        assert!(err.to_string().contains("logging.level"));
    }

    #[test]
    fn test_config_validate_read_buffer_too_small() {
        let mut config = FlatvecConfig::default();
        config.storage.read_buffer_size = 16;

        let err = config.validate().expect_err("should fail");
        assert!(err.to_string().contains("storage.read_buffer_size"));
    }

    #[test]
    fn test_config_validate_bad_warning_threshold() {
        let mut config = FlatvecConfig::default();
        config.disk.low_space_warning = "lots".to_string();

        let err = config.validate().expect_err("should fail");
        assert!(err.to_string().contains("disk.low_space_warning"));
    }

    #[test]
    fn test_config_malformed_hard_limit_still_validates() {
        let mut config = FlatvecConfig::default();
        config.disk.min_free_space = Some("plenty".to_string());
        assert!(config.validate().is_ok());
    }

    // ========================================================================
    // Serialization & sources
    // ========================================================================

    #[test]
    fn test_config_roundtrip() {
        // Arrange
        let mut config = FlatvecConfig::default();
        config.disk.min_free_space = Some("2GB".to_string());
        config.storage.default_format = StoreFormat::Text;

        // Act
        let toml_str = config.to_toml().expect("serialize");
        let parsed = FlatvecConfig::from_toml(&toml_str).expect("parse");

        // Assert
        assert_eq!(parsed.disk.min_free_space.as_deref(), Some("2GB"));
        assert_eq!(parsed.storage.default_format, StoreFormat::Text);
    }

    #[test]
    #[serial(env)]
    fn test_config_env_overrides_file() {
        // Arrange
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("flatvec.toml");
        std::fs::write(&path, "[disk]\nmin_free_space = \"1GB\"\n").expect("write");
        std::env::set_var("FLATVEC_DISK__MIN_FREE_SPACE", "3GB");

        // Act
        let config = FlatvecConfig::load_from_path(&path);
        std::env::remove_var("FLATVEC_DISK__MIN_FREE_SPACE");

        // Assert
        let config = config.expect("load");
        assert_eq!(config.disk.min_free_space.as_deref(), Some("3GB"));
    }

    #[test]
    #[serial(env)]
    fn test_config_missing_file_uses_defaults() {
        std::env::remove_var("FLATVEC_DISK__MIN_FREE_SPACE");
        let config =
            FlatvecConfig::load_from_path("/nonexistent/flatvec.toml").expect("defaults apply");
        assert!(config.disk.min_free_space.is_none());
    }

    // ========================================================================
    // Numeric byte sizes
    // ========================================================================

    #[test]
    #[serial(env)]
    fn test_config_env_plain_byte_count() {
        // Arrange
        std::env::set_var("FLATVEC_DISK__MIN_FREE_SPACE", "1048576");

        // Act
        let config = FlatvecConfig::load_from_path("/nonexistent/flatvec.toml");
        std::env::remove_var("FLATVEC_DISK__MIN_FREE_SPACE");

        // Assert
        let config = config.expect("numeric env value loads");
        assert_eq!(config.disk.min_free_space.as_deref(), Some("1048576"));
        assert_eq!(DiskSpaceGuard::from_config(&config.disk).hard_limit(), 1_048_576);
    }

    #[test]
    #[serial(env)]
    fn test_config_env_fractional_byte_count() {
        // Arrange
        std::env::set_var("FLATVEC_DISK__MIN_FREE_SPACE", "0.5");

        // Act
        let config = FlatvecConfig::load_from_path("/nonexistent/flatvec.toml");
        std::env::remove_var("FLATVEC_DISK__MIN_FREE_SPACE");

        // Assert
        let config = config.expect("float env value loads");
        assert_eq!(config.disk.min_free_space.as_deref(), Some("0.5"));
        assert_eq!(DiskSpaceGuard::from_config(&config.disk).hard_limit(), 0);
    }

    #[test]
    fn test_config_toml_unquoted_integers() {
        // Arrange
        let toml_str = r#"
[disk]
min_free_space = 1048576
low_space_warning = 2147483648
"#;

        // Act
        let config = FlatvecConfig::from_toml(toml_str).expect("parse");

        // Assert
        assert_eq!(config.disk.min_free_space.as_deref(), Some("1048576"));
        assert_eq!(config.disk.low_space_warning, "2147483648");
        assert!(config.validate().is_ok());
        let guard = DiskSpaceGuard::from_config(&config.disk);
        assert_eq!(guard.hard_limit(), 1_048_576);
        assert_eq!(guard.soft_limit(), 2_147_483_648);
    }
}
