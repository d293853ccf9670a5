mod tests {
    use approx::assert_relative_eq;

    use crate::mass_flux::MassFlux;
    use crate::time::Time;

    #[test]
    fn test_mass_flux_conversions() {
        let flux = MassFlux::from_grams_per_cm2_s(1.0e-6);
        assert_relative_eq!(flux.to_kg_per_m2_s(), 1.0e-5);
        assert_relative_eq!(flux.to_grams_per_cm2_s(), 1.0e-6);
    }

    #[test]
    fn test_mass_flux_accumulates_column() {
        let flux = MassFlux::from_kg_per_m2_s(2.0e-9);
        let sigma = flux.over(Time::from_seconds(1.0e4));
        assert_relative_eq!(sigma.to_kg_per_m2(), 2.0e-5);
    }

    #[test]
    fn test_non_negative_clamps() {
        let flux = MassFlux::from_kg_per_m2_s(-3.0);
        assert_eq!(flux.non_negative().to_kg_per_m2_s(), 0.0);
        let positive = MassFlux::from_kg_per_m2_s(3.0) - MassFlux::from_kg_per_m2_s(1.0);
        assert_relative_eq!(positive.non_negative().to_kg_per_m2_s(), 2.0);
    }
}
