use approx::assert_relative_eq;
use crate::utils::{inverse_square_force, rms_difference};

#[test]
fn test_unit_masses_unit_distance() {
    let (fx, fy) = inverse_square_force(0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 0.0);
    assert_relative_eq!(fx, 1.0);
    assert_relative_eq!(fy, 0.0);
}

#[test]
fn test_inverse_square_falloff() {
    let (near, _) = inverse_square_force(0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 0.0);
    let (far, _) = inverse_square_force(0.0, 0.0, 1.0, 2.0, 0.0, 1.0, 1.0, 0.0);
    assert_relative_eq!(far, near / 4.0, epsilon = 1e-12);
}

#[test]
fn test_direction_is_unit_vector_scaled() {
    // 3-4-5 triangle: magnitude 1/25, direction (0.6, 0.8).
    let (fx, fy) = inverse_square_force(0.0, 0.0, 1.0, 3.0, 4.0, 1.0, 1.0, 0.0);
    assert_relative_eq!(fx, 0.6 / 25.0, epsilon = 1e-15);
    assert_relative_eq!(fy, 0.8 / 25.0, epsilon = 1e-15);
}

#[test]
fn test_opposite_signs_repel() {
    let (fx, _) = inverse_square_force(0.0, 0.0, 1.0, 1.0, 0.0, -1.0, 1.0, 0.0);
    assert!(fx < 0.0, "Opposite signs should push the query away from the source");
}

#[test]
fn test_coincident_pair_is_finite_and_zero() {
    let (fx, fy) = inverse_square_force(2.0, 2.0, 1.0, 2.0, 2.0, 5.0, 1.0, 0.0);
    assert_eq!((fx, fy), (0.0, 0.0));
}

#[test]
fn test_min_separation_caps_the_force() {
    let (soft, _) = inverse_square_force(0.0, 0.0, 1.0, 1e-6, 0.0, 1.0, 1.0, 0.1);
    // d is raised to 0.1, so the magnitude becomes dx / 0.1^3.
    assert_relative_eq!(soft, 1e-6 / 1e-3, epsilon = 1e-12);
}

#[test]
fn test_rms_difference() {
    assert_eq!(rms_difference(&[], &[]), 0.0);
    assert_relative_eq!(rms_difference(&[1.0, 2.0], &[1.0, 4.0]), 2.0_f64.sqrt());
}
