mod tests {
    use approx::assert_relative_eq;

    use crate::mass::{Mass, MARS_MASS_KG};

    #[test]
    fn test_mass_conversions() {
        let grain = Mass::from_grams(2.0);
        assert_relative_eq!(grain.to_kg(), 2.0e-3);
        assert_relative_eq!(grain.to_grams(), 2.0);

        let disk = Mass::from_mars_masses(3.0e-5);
        assert_relative_eq!(disk.to_kg(), 3.0e-5 * MARS_MASS_KG);
        assert_relative_eq!(disk.to_mars_masses(), 3.0e-5);
    }

    #[test]
    fn test_mass_ratio_and_scaling() {
        let a = Mass::from_kg(6.0);
        let b = Mass::from_kg(2.0);

        assert_relative_eq!(a / b, 3.0);
        assert_relative_eq!((a - b).to_kg(), 4.0);
        assert_relative_eq!((0.5 * a).to_kg(), 3.0);
    }
}
