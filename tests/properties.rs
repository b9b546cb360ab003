use proptest::prelude::*;

use seismic_source::rotation::{
    rotate_symm_tensor_voigt_earth_to_src, rotate_symm_tensor_voigt_src_to_earth,
};
use seismic_source::source::Located;
use seismic_source::{
    FiniteSource, GeodeticPoint, MomentTensor, Source, SourceTimeFunction, VoigtTensor,
    EARTH_RADIUS_M,
};

proptest! {
    /// Depth is measured down from the reference radius.
    #[test]
    fn prop_radius_law(
        lat in -90.0f64..=90.0,
        lon in -360.0f64..360.0,
        depth in 0.0f64..700_000.0,
        radius in 1e6f64..1e7,
    ) {
        let point = GeodeticPoint::new(lat, lon, Some(depth)).unwrap();
        prop_assert!((point.radius_in_m(radius) - (radius - depth)).abs() < 1e-6);
    }

    /// Cartesian positions lie on the sphere of the point's radius.
    #[test]
    fn prop_cartesian_on_sphere(
        lat in -90.0f64..=90.0,
        lon in -180.0f64..180.0,
        depth in 0.0f64..700_000.0,
    ) {
        let point = GeodeticPoint::new(lat, lon, Some(depth)).unwrap();
        let r = point.radius_in_m(EARTH_RADIUS_M);
        let norm = point.cartesian(EARTH_RADIUS_M).norm();
        prop_assert!((norm - r).abs() / r < 1e-12);
    }

    #[test]
    fn prop_latitude_out_of_range_rejected(
        excess in 1e-9f64..1e3,
        south in any::<bool>(),
    ) {
        let lat = if south { -90.0 - excess } else { 90.0 + excess };
        prop_assert!(GeodeticPoint::new(lat, 0.0, None).is_err());
    }

    /// A double couple keeps its scalar moment and Mw follows from it.
    #[test]
    fn prop_double_couple_magnitude(
        strike in 0.0f64..360.0,
        dip in 0.0f64..90.0,
        rake in -180.0f64..180.0,
        log_m0 in 10.0f64..23.0,
    ) {
        let m0 = 10f64.powf(log_m0);
        let tensor = MomentTensor::from_strike_dip_rake(strike, dip, rake, m0);
        prop_assert!((tensor.m0() - m0).abs() / m0 < 1e-9);
        let expected = 2.0 / 3.0 * m0.log10() - 6.0;
        prop_assert!((tensor.moment_magnitude() - expected).abs() < 1e-9);
    }

    #[test]
    fn prop_rotation_round_trip(
        components in prop::array::uniform6(-1e3f64..1e3),
        lon in -180.0f64..180.0,
        colat in 0.0f64..180.0,
    ) {
        let tensor = VoigtTensor(components);
        let (phi, theta) = (lon.to_radians(), colat.to_radians());
        let earth = rotate_symm_tensor_voigt_src_to_earth(&tensor, phi, theta);
        let back = rotate_symm_tensor_voigt_earth_to_src(&earth, phi, theta);
        for (a, b) in back.0.iter().zip(tensor.0.iter()) {
            prop_assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn prop_normalized_sliprate_integrates_to_one(
        samples in prop::collection::vec(0.01f64..10.0, 2..64),
        dt in 1e-3f64..1.0,
    ) {
        let mut stf = SourceTimeFunction::new(samples, dt).unwrap();
        stf.normalize().unwrap();
        prop_assert!((stf.integral() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn prop_resample_onto_same_axis_is_identity(
        samples in prop::collection::vec(-10.0f64..10.0, 1..64),
        dt in 1e-3f64..1.0,
    ) {
        let mut stf = SourceTimeFunction::new(samples.clone(), dt).unwrap();
        stf.resample(dt, samples.len()).unwrap();
        for (a, b) in stf.samples().iter().zip(samples.iter()) {
            prop_assert!((a - b).abs() < 1e-9);
        }
    }

    /// Collapsing a single point source gives the source back.
    #[test]
    fn prop_single_source_centroid(
        lat in -80.0f64..80.0,
        lon in -179.0f64..179.0,
        depth in 0.0f64..600_000.0,
        strike in 0.0f64..360.0,
        dip in 1.0f64..89.0,
        rake in -180.0f64..180.0,
    ) {
        let point = GeodeticPoint::new(lat, lon, Some(depth)).unwrap();
        let mut source = Source::from_strike_dip_rake(point, strike, dip, rake, 1e18);
        source.set_sliprate_dirac(0.5, 16).unwrap();

        let mut finite = FiniteSource::new(vec![source.clone()]);
        let cmt = finite.compute_centroid(EARTH_RADIUS_M, None, None).unwrap();

        prop_assert!((cmt.latitude() - lat).abs() < 1e-8);
        prop_assert!((cmt.longitude() - lon).abs() < 1e-8);
        prop_assert!((cmt.depth_in_m().unwrap() - depth).abs() < 1e-3);
        for (a, b) in cmt.tensor().0.iter().zip(source.tensor().0.iter()) {
            prop_assert!((a - b).abs() < 1e-6 * 1e18);
        }
    }
}
