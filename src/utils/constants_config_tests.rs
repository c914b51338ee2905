use crate::utils::{BarnesHutConfig, PhysicsError, DEFAULT_BARNES_HUT_CONFIG};

#[test]
fn test_default_matches_constant() {
    assert_eq!(BarnesHutConfig::default(), DEFAULT_BARNES_HUT_CONFIG);
    assert_eq!(BarnesHutConfig::default().gravitational_constant, 1.0);
}

#[test]
fn test_new_falls_back_to_defaults() {
    let config = BarnesHutConfig::new(Some(6.67430e-11), None, None, Some(0.01), None, Some(0));
    assert_eq!(config.gravitational_constant, 6.67430e-11);
    assert_eq!(config.opening_angle, DEFAULT_BARNES_HUT_CONFIG.opening_angle);
    assert_eq!(config.min_separation, 0.01);
    assert_eq!(config.workers, 0);
}

#[test]
fn test_validate_rejects_bad_values() {
    let bad_tau = BarnesHutConfig::default().with_opening_angle(f64::NAN);
    assert!(matches!(bad_tau.validate(), Err(PhysicsError::ConfigurationError(_))));

    let mut bad_leeway = BarnesHutConfig::default();
    bad_leeway.leeway = -0.5;
    assert!(bad_leeway.validate().is_err());
    bad_leeway.leeway = 0.0;
    assert!(bad_leeway.validate().is_err());

    let mut bad_g = BarnesHutConfig::default();
    bad_g.gravitational_constant = f64::INFINITY;
    assert!(bad_g.validate().is_err());
}

#[test]
fn test_zero_tau_is_valid() {
    assert!(BarnesHutConfig::default().with_opening_angle(0.0).validate().is_ok());
}
