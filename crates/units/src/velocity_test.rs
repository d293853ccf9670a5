mod tests {
    use approx::assert_relative_eq;

    use crate::length::Length;
    use crate::mass::Mass;
    use crate::velocity::{keplerian_velocity, Velocity, GRAVITATIONAL_CONSTANT};

    #[test]
    fn test_velocity_conversions() {
        let v = Velocity::from_km_per_sec(3.0);
        assert_relative_eq!(v.to_meters_per_sec(), 3000.0);
        assert_relative_eq!(v.to_cm_per_sec(), 3.0e5);

        let slow = Velocity::from_cm_per_sec(50.0);
        assert_relative_eq!(slow.to_meters_per_sec(), 0.5);
    }

    #[test]
    fn test_keplerian_velocity_matches_definition() {
        let mass = Mass::from_kg(1.0e24);
        let radius = Length::from_km(7000.0);
        let v = keplerian_velocity(mass, radius);

        let expected = (GRAVITATIONAL_CONSTANT * 1.0e24 / 7.0e6).sqrt();
        assert_relative_eq!(v.to_meters_per_sec(), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_orbital_frequency() {
        let radius = Length::from_km(6779.0);
        let v = Velocity::from_meters_per_sec(2500.0);
        let omega = v.orbital_frequency(radius);
        assert_relative_eq!(omega.to_rad_per_sec(), 2500.0 / 6.779e6, max_relative = 1e-12);
    }
}
