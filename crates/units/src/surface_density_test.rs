mod tests {
    use approx::assert_relative_eq;

    use crate::surface_density::SurfaceDensity;
    use crate::time::Time;

    #[test]
    fn test_surface_density_conversions() {
        let sigma = SurfaceDensity::from_grams_per_cm2(2.5);
        assert_relative_eq!(sigma.to_kg_per_m2(), 25.0);
        assert_relative_eq!(sigma.to_grams_per_cm2(), 2.5);
    }

    #[test]
    fn test_surface_density_arithmetic() {
        let a = SurfaceDensity::from_kg_per_m2(4.0);
        let b = SurfaceDensity::from_kg_per_m2(1.0);

        assert_relative_eq!((a + b).to_kg_per_m2(), 5.0);
        assert_relative_eq!((a - b).to_kg_per_m2(), 3.0);
        assert_relative_eq!((a * 0.5).to_kg_per_m2(), 2.0);
        assert_relative_eq!(a / b, 4.0);
    }

    #[test]
    fn test_surface_density_over_time_is_flux() {
        let sigma = SurfaceDensity::from_kg_per_m2(10.0);
        let flux = sigma / Time::from_seconds(5.0);
        assert_relative_eq!(flux.to_kg_per_m2_s(), 2.0);
    }

    #[test]
    fn test_power_law_scaling() {
        let sigma0 = SurfaceDensity::from_kg_per_m2(100.0);
        let scaled = sigma0.power_law_scaling(2.0, 1.0);
        assert_relative_eq!(scaled.to_kg_per_m2(), 50.0);
    }
}
