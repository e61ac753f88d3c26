use cal_core::config::*;
use cal_core::errors::ConfigError;

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = ExperimentConfig::from_toml("").unwrap();

    assert_eq!(config.experiment_name, "cal");
    assert_eq!(config.update_ratio, 0.05);
    assert_eq!(config.n_runs, 5);
    assert_eq!(config.seeds(), vec![0]);
    assert!(config.z_dim.is_none());

    assert_eq!(config.dataset.name, "mnist");
    assert_eq!(config.dataset.init_lbl_ratio, 0.1);
    assert_eq!(config.dataset.val_ratio, 0.1);

    assert_eq!(config.smp.name, "cal");
    assert_eq!(config.smp.n_neighs, 10);
    assert_eq!(config.smp.neigh_dist, "l2");

    assert!(config.embedding.train_vae);
    assert_eq!(config.observability.log_level, "info");
    assert!(config.validate().is_ok());
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
experiment_name = "cal_cifar"
n_runs = 8
seed = [1, 2, 3]

[dataset]
name = "cifar10"
val_ratio = 0.0

[smp]
name = "cal_pca"
n_pca_comp = 16
"#;
    let config = ExperimentConfig::from_toml(toml).unwrap();
    assert_eq!(config.experiment_name, "cal_cifar");
    assert_eq!(config.n_runs, 8);
    assert_eq!(config.seeds(), vec![1, 2, 3]);
    assert_eq!(config.dataset.name, "cifar10");
    assert_eq!(config.dataset.val_ratio, 0.0);
    // Non-overridden fields keep defaults.
    assert_eq!(config.dataset.init_lbl_ratio, 0.1);
    assert_eq!(config.smp.n_neighs, 10);

    match config.sampler_spec().unwrap() {
        SamplerSpec::CalPca { n_components, .. } => assert_eq!(n_components, 16),
        other => panic!("unexpected sampler {other:?}"),
    }
}

#[test]
fn config_serde_roundtrip() {
    let config = ExperimentConfig::default();
    let toml_str = toml::to_string(&config).unwrap();
    let roundtripped = ExperimentConfig::from_toml(&toml_str).unwrap();
    assert_eq!(roundtripped.n_runs, config.n_runs);
    assert_eq!(roundtripped.smp.name, config.smp.name);
    assert_eq!(roundtripped.seeds(), config.seeds());
}

#[test]
fn config_loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("experiment.toml");
    std::fs::write(&path, "n_runs = 3\n[smp]\nname = \"random\"\n").unwrap();

    let config = ExperimentConfig::from_file(&path).unwrap();
    assert_eq!(config.n_runs, 3);
    assert_eq!(config.sampler_spec().unwrap(), SamplerSpec::Random);
}

#[test]
fn missing_file_is_reported() {
    let err = ExperimentConfig::from_file(std::path::Path::new("/nonexistent/cal.toml"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound { .. }));
}

#[test]
fn invalid_toml_is_a_parse_error() {
    let err = ExperimentConfig::from_toml("n_runs = \"five\"").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn negative_ratio_is_rejected() {
    let mut config = ExperimentConfig::default();
    config.dataset.init_lbl_ratio = -0.1;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidRatio { .. })
    ));
}

#[test]
fn ratios_summing_past_one_are_rejected() {
    let mut config = ExperimentConfig::default();
    config.dataset.init_lbl_ratio = 0.7;
    config.dataset.val_ratio = 0.4;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::RatioOverflow { .. })
    ));
}

#[test]
fn zero_runs_are_rejected() {
    let mut config = ExperimentConfig::default();
    config.n_runs = 0;
    assert!(config.validate().is_err());
}

#[test]
fn unknown_sampler_fails_validation() {
    let mut config = ExperimentConfig::default();
    config.smp.name = "badge".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::UnknownSampler { .. })
    ));
}

#[test]
fn latent_dim_mismatch_is_rejected() {
    let toml = r#"
z_dim = 32

[btk]
name = "vae"
z_dim = 16
"#;
    let config = ExperimentConfig::from_toml(toml).unwrap();
    match config.validate() {
        Err(ConfigError::LatentDimMismatch {
            component,
            expected,
            actual,
        }) => {
            assert_eq!(component, "btk.z_dim");
            assert_eq!(expected, 32);
            assert_eq!(actual, 16);
        }
        other => panic!("expected latent mismatch, got {other:?}"),
    }
}

#[test]
fn latent_dims_compare_against_first_declared_without_z_dim() {
    let mut config = ExperimentConfig::default();
    config.enc.z_dim = Some(8);
    config.smp.latent_dim = Some(10);
    assert!(matches!(
        config.validate(),
        Err(ConfigError::LatentDimMismatch { .. })
    ));
}

#[test]
fn env_overrides_take_precedence() {
    let mut config = ExperimentConfig::from_toml("n_runs = 3").unwrap();
    config
        .apply_overrides_from(|key| match key {
            "CAL_N_RUNS" => Some("7".to_string()),
            "CAL_SEED" => Some("4, 5,6".to_string()),
            "CAL_SMP_NAME" => Some("random".to_string()),
            _ => None,
        })
        .unwrap();
    assert_eq!(config.n_runs, 7);
    assert_eq!(config.seeds(), vec![4, 5, 6]);
    assert_eq!(config.smp.name, "random");
}

#[test]
fn malformed_env_override_is_rejected() {
    let mut config = ExperimentConfig::default();
    let err = config
        .apply_overrides_from(|key| (key == "CAL_UPDATE_RATIO").then(|| "lots".to_string()))
        .unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { .. }));
}

#[test]
fn batch_size_rounds_update_ratio() {
    let config = ExperimentConfig::default();
    assert_eq!(config.batch_size(100), 5);
    assert_eq!(config.batch_size(50), 3);
    assert_eq!(config.updates_required(), 4);
}

#[test]
fn split_ratio_checks_are_shared() {
    assert!(check_split_ratios(0.3, 0.7).is_ok());
    assert!(matches!(
        check_split_ratios(0.6, 0.5),
        Err(ConfigError::RatioOverflow { .. })
    ));
    match check_split_ratios(0.1, f64::NAN) {
        Err(ConfigError::InvalidRatio { field, .. }) => assert_eq!(field, "dataset.val_ratio"),
        other => panic!("unexpected {other:?}"),
    }
    assert!(check_ratio("update_ratio", -0.01).is_err());
}

#[test]
fn embedding_width_is_checked_against_declared_dims() {
    let mut config = ExperimentConfig::default();
    config.smp.latent_dim = Some(16);
    assert!(config.check_embedding_dim("table", 16).is_ok());
    assert!(matches!(
        config.check_embedding_dim("table", 8),
        Err(ConfigError::LatentDimMismatch { expected: 16, actual: 8, .. })
    ));

    let mut pca = ExperimentConfig::default();
    pca.smp.name = "cal_pca".to_string();
    pca.smp.n_pca_comp = 8;
    assert!(pca.check_embedding_dim("table", 8).is_ok());
    assert!(matches!(
        pca.check_embedding_dim("table", 4),
        Err(ConfigError::ValidationFailed { .. })
    ));
}
