mod tests {
    use approx::assert_relative_eq;

    use crate::specific_energy::SpecificEnergy;

    #[test]
    fn test_specific_energy_conversions() {
        let q = SpecificEnergy::from_erg_per_gram(3.5e7);
        assert_relative_eq!(q.to_j_per_kg(), 3.5e3);
        assert_relative_eq!(q.to_erg_per_gram(), 3.5e7);
    }

    #[test]
    fn test_specific_energy_ratio() {
        let q_r = SpecificEnergy::from_j_per_kg(500.0);
        let q_star = SpecificEnergy::from_j_per_kg(1000.0);
        assert_relative_eq!(q_r / q_star, 0.5);
        assert_relative_eq!((q_r + q_star * 2.0).to_j_per_kg(), 2500.0);
    }
}
