use std::path::PathBuf;

use crate::particles::{Particle, ParticleSystem, Region};
use crate::utils::PhysicsError;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("rs_barnes_hut_{}_{}", std::process::id(), name))
}

#[test]
fn test_load_three_field_records() {
    let input = "0.0 0.0 1.0\n1.5 -2.0 3.0\n-1.0 4.0 -0.5\n";
    let system = ParticleSystem::load_from_reader(input.as_bytes(), false).expect("Failed to parse particles");

    assert_eq!(system.len(), 3);
    assert_eq!(system.get(1), Some(&Particle::new(1.5, -2.0, 3.0)));
    assert_eq!(system.get(2).map(|p| p.mass), Some(-0.5));
    assert!(system.particles().iter().all(|p| p.force() == (0.0, 0.0)));
}

#[test]
fn test_load_five_field_records() {
    let input = "0.0 0.0 1.0 0.25 -0.75\n";
    let system = ParticleSystem::load_from_reader(input.as_bytes(), true).expect("Failed to parse particles");
    assert_eq!(system.get(0), Some(&Particle::with_force(0.0, 0.0, 1.0, 0.25, -0.75)));
}

#[test]
fn test_blank_lines_and_mixed_whitespace() {
    let input = "\n  1.0\t2.0   3.0\n\n   \n4.0 5.0 6.0";
    let system = ParticleSystem::load_from_reader(input.as_bytes(), false).expect("Failed to parse particles");
    assert_eq!(system.len(), 2);
    assert_eq!(system.get(1), Some(&Particle::new(4.0, 5.0, 6.0)));
}

#[test]
fn test_empty_input_gives_empty_system() {
    let system = ParticleSystem::load_from_reader("".as_bytes(), false).expect("Empty input is valid");
    assert!(system.is_empty());
    assert_eq!(system.bounds(), None);
}

#[test]
fn test_wrong_field_count_reports_line() {
    let input = "0.0 0.0 1.0\n\n1.0 2.0\n";
    let result = ParticleSystem::load_from_reader(input.as_bytes(), false);
    match result {
        Err(PhysicsError::MalformedInput { line, .. }) => assert_eq!(line, 3),
        other => panic!("Expected MalformedInput, got {:?}", other),
    }

    // A saved file read as raw input has too many fields.
    let result = ParticleSystem::load_from_reader("0 0 1 0 0\n".as_bytes(), false);
    assert!(matches!(result, Err(PhysicsError::MalformedInput { line: 1, .. })));
}

#[test]
fn test_non_numeric_and_non_finite_fields() {
    for input in ["0.0 abc 1.0\n", "0.0 NaN 1.0\n", "inf 0.0 1.0\n"] {
        let result = ParticleSystem::load_from_reader(input.as_bytes(), false);
        assert!(
            matches!(result, Err(PhysicsError::MalformedInput { line: 1, .. })),
            "input {:?} should be rejected, got {:?}", input, result
        );
    }
}

#[test]
fn test_bounds_track_extremes() {
    let mut system = ParticleSystem::from_particles(vec![
        Particle::new(1.0, 1.0, 1.0),
        Particle::new(-3.0, 2.0, 1.0),
    ]);
    assert_eq!(system.bounds(), Some(Region::new(-3.0, 1.0, 1.0, 2.0)));

    system.push(Particle::new(0.0, -5.0, 1.0));
    assert_eq!(system.bounds(), Some(Region::new(-3.0, 1.0, -5.0, 2.0)));

    system.clear();
    assert!(system.is_empty());
    assert_eq!(system.bounds(), None);
}

#[test]
fn test_zero_forces() {
    let mut system = ParticleSystem::from_particles(vec![
        Particle::with_force(0.0, 0.0, 1.0, 3.0, 4.0),
        Particle::with_force(1.0, 0.0, 1.0, -1.0, 0.5),
    ]);
    system.zero_forces();
    assert!(system.particles().iter().all(|p| p.force() == (0.0, 0.0)));
}

#[test]
fn test_save_then_load_with_forces() {
    let path = temp_path("save_then_load");
    let system = ParticleSystem::from_particles(vec![
        Particle::with_force(0.5, -1.25, 2.0, 0.125, -3.5),
        Particle::with_force(10.0, 0.0, -1.0, 0.0, 0.0),
    ]);
    system.save(&path).expect("Failed to save particles");

    let contents = std::fs::read_to_string(&path).expect("Failed to read saved file");
    assert_eq!(contents.lines().count(), 2);
    assert_eq!(contents.lines().next(), Some(" 0.5000\t-1.2500\t 2.0000\t 0.1250\t-3.5000"));

    let loaded = ParticleSystem::from_file(&path, true).expect("Failed to reload particles");
    assert_eq!(loaded, system);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_failed_load_leaves_system_empty() {
    let path = temp_path("failed_load");
    std::fs::write(&path, "0.0 0.0 1.0\nbroken line here\n").expect("Failed to write fixture");

    let mut system = ParticleSystem::from_particles(vec![Particle::new(9.0, 9.0, 9.0)]);
    let result = system.load(&path, false);
    assert!(matches!(result, Err(PhysicsError::MalformedInput { line: 2, .. })));
    assert!(system.is_empty());
    assert_eq!(system.bounds(), None);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_missing_file_is_io_error() {
    let mut system = ParticleSystem::new();
    let result = system.load(temp_path("does_not_exist"), false);
    assert!(matches!(result, Err(PhysicsError::Io(_))));
}

#[test]
fn test_display_is_framed() {
    let system = ParticleSystem::from_particles(vec![Particle::new(1.0, 2.0, 3.0)]);
    let text = system.to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.first(), Some(&"<-- ParticleSystem -->"));
    assert_eq!(lines.get(1), Some(&"size = 1"));
    assert_eq!(lines.last(), Some(&"<-- ParticleSystem -->"));
    assert_eq!(lines.len(), 4);
}

#[test]
fn test_random_disk_is_seeded() {
    let first = crate::particles::random_disk(500, 2.0, true, 7);
    let again = crate::particles::random_disk(500, 2.0, true, 7);
    let other = crate::particles::random_disk(500, 2.0, true, 8);
    assert_eq!(first, again);
    assert_ne!(first, other);

    assert!(first.particles().iter().all(|p| p.x.hypot(p.y) <= 2.0 + 1e-9));
    assert!(first.particles().iter().any(|p| p.mass < 0.0));
    assert!(first.particles().iter().any(|p| p.mass > 0.0));
    assert!(first.particles().iter().all(|p| (0.1..1.0).contains(&p.mass.abs())));
}
