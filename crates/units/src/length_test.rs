mod tests {
    use approx::assert_relative_eq;

    use crate::length::{Length, MARS_RADIUS_M};

    #[test]
    fn test_length_conversions() {
        let grain = Length::from_microns(10.0);
        assert_relative_eq!(grain.to_m(), 1.0e-5);
        assert_relative_eq!(grain.to_cm(), 1.0e-3);
        assert_relative_eq!(grain.to_microns(), 10.0);

        let orbit = Length::from_mars_radii(1.5);
        assert_relative_eq!(orbit.to_m(), 1.5 * MARS_RADIUS_M);
        assert_relative_eq!(orbit.to_km(), 1.5 * MARS_RADIUS_M / 1.0e3);
        assert_relative_eq!(orbit.to_mars_radii(), 1.5);
    }

    #[test]
    fn test_length_arithmetic_operations() {
        let a = Length::from_meters(5.0);
        let b = Length::from_meters(3.0);

        assert_relative_eq!((a + b).to_m(), 8.0);
        assert_relative_eq!((a - b).to_m(), 2.0);
        assert_relative_eq!((a * 2.0).to_m(), 10.0);
        assert_relative_eq!((a / 2.0).to_m(), 2.5);
        assert_relative_eq!((1.5 * a).to_m(), 7.5);
        assert_relative_eq!(a / b, 5.0 / 3.0);
    }

    #[test]
    fn test_length_min_max() {
        let a = Length::from_meters(5.0);
        let b = Length::from_meters(3.0);

        assert_relative_eq!(a.min(b).to_m(), 3.0);
        assert_relative_eq!(a.max(b).to_m(), 5.0);
    }
}
