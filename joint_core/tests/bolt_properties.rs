//! Bolt group shear and plate tension through the public API.

use approx::assert_abs_diff_eq;
use joint_core::calculations::bolt::{analyze, BoltConnection, BoltResult};
use joint_core::calculations::{AnalysisMethod, CalculationItem, CalculationOutput, FallbackReason, MethodUsed};
use joint_core::geometry::{BoltGroup, Plate, Vec2};
use joint_core::loads::AppliedLoad;
use joint_core::settings::AnalysisSettings;
use joint_core::solvers::tension::TensionMethod;

fn run(connection: &BoltConnection, load: &AppliedLoad, method: AnalysisMethod) -> BoltResult {
    analyze(connection, load, method, &AnalysisSettings::default()).unwrap()
}

fn unplated(group: BoltGroup) -> BoltConnection {
    BoltConnection::new(group, None).unwrap()
}

#[test]
fn two_bolt_eccentric_shear() {
    let group = BoltGroup::new(vec![Vec2::new(0.0, -50.0), Vec2::new(0.0, 50.0)], 20.0).unwrap();
    let load = AppliedLoad::shear_at(-100.0, 0.0, 0.0, 100.0);
    let result = run(&unplated(group), &load, AnalysisMethod::Icr);

    assert_eq!(result.method_used, MethodUsed::Icr);
    let icr = result.icr.unwrap();
    assert!(icr.converged);
    assert_abs_diff_eq!(icr.icr_point.z, -48.563, epsilon = 0.05);

    // Bolt nearer the load takes the larger share
    assert_abs_diff_eq!(result.forces[0].fy, 50.0, epsilon = 0.05);
    assert_abs_diff_eq!(result.forces[1].fy, -150.0, epsilon = 0.05);
    assert_abs_diff_eq!(result.net_shear().y, -100.0, epsilon = 1e-9);
}

#[test]
fn symmetric_pattern_balances_exactly() {
    let group = BoltGroup::from_pattern(4, 2, 75.0, 90.0, Vec2::default(), 22.0).unwrap();
    let load = AppliedLoad::shear_at(-200_000.0, 0.0, 0.0, 150.0);
    let moment = load.moments_about(Default::default()).0;
    let result = run(&unplated(group), &load, AnalysisMethod::Icr);
    let icr = result.icr.unwrap();

    assert!(icr.converged);
    assert!(icr.icr_point.y.abs() < 1e-9);
    assert_abs_diff_eq!(icr.icr_point.z, -56.41, epsilon = 0.05);

    let net = result.net_shear();
    assert_abs_diff_eq!(net.y, -200_000.0, epsilon = 1e-6);
    assert_abs_diff_eq!(net.z, 0.0, epsilon = 1e-6);
    let tolerance = AnalysisSettings::default().search.tolerance * (moment / 200_000.0).abs();
    assert!((result.net_moment_about(Vec2::default()) - moment).abs() <= tolerance * 200_000.0 * 1.0001);
}

#[test]
fn icr_relieves_the_corner_bolt() {
    let group = BoltGroup::from_pattern(3, 2, 75.0, 100.0, Vec2::default(), 20.0).unwrap();
    let connection = unplated(group);
    let load = AppliedLoad::shear_at(-60_000.0, 0.0, 0.0, 150.0);
    let icr = run(&connection, &load, AnalysisMethod::Icr);
    let elastic = run(&connection, &load, AnalysisMethod::Elastic);

    // Corner bolt: 10 kN direct plus 9e6 * (50, 75) / 37500 from torsion
    assert_abs_diff_eq!(elastic.max_shear(), 22_000f64.hypot(18_000.0), epsilon = 1e-6);
    assert_abs_diff_eq!(icr.max_shear(), 24_010.0, epsilon = 5.0);
    assert!(icr.max_shear() < elastic.max_shear());
}

#[test]
fn single_bolt_is_rejected() {
    // A lone bolt has no polar moment, so no eccentric load can be balanced
    let err = BoltGroup::new(vec![Vec2::default()], 20.0).unwrap_err();
    assert_eq!(err.error_code(), "DEGENERATE_GEOMETRY");

    let json = r#"{
        "type": "Bolt",
        "label": "Lone",
        "positions": [{"y": 0.0, "z": 0.0}],
        "diameter": 20.0,
        "load": {"fy": -100.0, "location": {"x": 0.0, "y": 0.0, "z": 50.0}}
    }"#;
    let item: CalculationItem = serde_json::from_str(json).unwrap();
    let err = item.calculate(&AnalysisSettings::default()).unwrap_err();
    assert_eq!(err.error_code(), "DEGENERATE_GEOMETRY");
}

#[test]
fn oblique_load_on_asymmetric_pattern_balances() {
    let group = BoltGroup::new(
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(75.0, 0.0),
            Vec2::new(150.0, 0.0),
            Vec2::new(0.0, 75.0),
            Vec2::new(0.0, 150.0),
        ],
        20.0,
    )
    .unwrap();
    let centroid = group.properties().centroid;
    let connection = unplated(group);
    let load = AppliedLoad::shear_at(-60_000.0, 0.0, 0.0, 150.0);
    let moment = load.moments_about(joint_core::loads::Point3::new(0.0, centroid.y, centroid.z)).0;

    let icr = run(&connection, &load, AnalysisMethod::Icr);
    let elastic = run(&connection, &load, AnalysisMethod::Elastic);
    assert_eq!(icr.method_used, MethodUsed::Icr);
    assert!(icr.max_shear() < elastic.max_shear());

    let diagnostics = icr.icr.unwrap();
    assert!(diagnostics.converged);
    assert_abs_diff_eq!(diagnostics.icr_point.y, 51.55, epsilon = 0.05);
    assert_abs_diff_eq!(diagnostics.icr_point.z, -15.45, epsilon = 0.05);

    let net = icr.net_shear();
    assert_abs_diff_eq!(net.y, -60_000.0, epsilon = 0.5);
    assert_abs_diff_eq!(net.z, 0.0, epsilon = 0.5);
    assert!((icr.net_moment_about(centroid) - moment).abs() <= 1e-5 * moment.abs());
}

#[test]
fn concentric_shear_is_shared_equally() {
    let group = BoltGroup::from_circle(6, 80.0, Vec2::new(10.0, -20.0), 20.0).unwrap();
    let load = AppliedLoad::shear_at(3_000.0, -6_000.0, 10.0, -20.0);
    let result = run(&unplated(group), &load, AnalysisMethod::Icr);

    assert_eq!(result.method_used, MethodUsed::ElasticFallback(FallbackReason::PureShear));
    for force in &result.forces {
        assert_abs_diff_eq!(force.fy, 500.0, epsilon = 1e-9);
        assert_abs_diff_eq!(force.fz, -1_000.0, epsilon = 1e-9);
    }
}

#[test]
fn plate_tension_combines_with_shear() {
    let group = BoltGroup::new(
        vec![
            Vec2::new(-50.0, -80.0),
            Vec2::new(-50.0, 80.0),
            Vec2::new(50.0, -80.0),
            Vec2::new(50.0, 80.0),
        ],
        20.0,
    )
    .unwrap();
    let plate = Plate::from_dimensions(200.0, 300.0, Vec2::default());
    let connection = BoltConnection::new(group, Some(plate)).unwrap();
    let load = AppliedLoad::force(0.0, -8_000.0, 0.0).with_moments(0.0, 1.0e6, 0.0);

    let result = run(&connection, &load, AnalysisMethod::Icr);
    assert_eq!(result.method_used, MethodUsed::ElasticFallback(FallbackReason::PureShear));
    assert_eq!(result.tension_method, TensionMethod::Conservative);

    let tension = result.tension.as_ref().unwrap();
    let about_y = tension.about_y.as_ref().unwrap();
    assert_abs_diff_eq!(about_y.critical_row_force, 1.0e6 / 230.0, epsilon = 1e-9);

    for (i, force) in result.forces.iter().enumerate() {
        assert_abs_diff_eq!(force.fy, -2_000.0, epsilon = 1e-9);
        let expected = if force.position.z > 0.0 { 1.0e6 / 460.0 } else { 0.0 };
        assert_abs_diff_eq!(force.fx, expected, epsilon = 1e-9);
        assert_eq!(force.fx, tension.tensions[i]);
    }
    assert_abs_diff_eq!(result.max_resultant(), 2_000f64.hypot(1.0e6 / 460.0), epsilon = 1e-9);
}

#[test]
fn out_of_plane_load_needs_a_plate() {
    let group = BoltGroup::from_pattern(2, 2, 100.0, 100.0, Vec2::default(), 20.0).unwrap();
    let load = AppliedLoad::force(5_000.0, -1_000.0, 0.0);
    let err = analyze(&unplated(group), &load, AnalysisMethod::Elastic, &AnalysisSettings::default()).unwrap_err();
    assert_eq!(err.error_code(), "MISSING_PLATE");
}

#[test]
fn empty_group_is_rejected() {
    let err = BoltGroup::new(Vec::new(), 20.0).unwrap_err();
    assert_eq!(err.error_code(), "DEGENERATE_GEOMETRY");
}

#[test]
fn calculation_item_from_json() {
    let json = r#"{
        "type": "Bolt",
        "label": "Bracket",
        "positions": [
            {"y": -50.0, "z": -80.0}, {"y": -50.0, "z": 80.0},
            {"y": 50.0, "z": -80.0}, {"y": 50.0, "z": 80.0}
        ],
        "diameter": 20.0,
        "plate": {"y_min": -100.0, "y_max": 100.0, "z_min": -150.0, "z_max": 150.0},
        "capacity": {"nominal_capacity": 120000.0, "resistance_factor": 0.75},
        "n_shear_planes": 2,
        "load": {"fy": -40000.0, "my": 2.0e6, "location": {"x": 0.0, "y": 0.0, "z": 120.0}}
    }"#;
    let item: CalculationItem = serde_json::from_str(json).unwrap();
    let output = item.calculate(&AnalysisSettings::default()).unwrap();

    let CalculationOutput::Bolt(result) = output else {
        panic!("expected a bolt result");
    };
    assert_eq!(result.method_requested, AnalysisMethod::Icr);
    assert!(result.method_used.is_icr());
    assert_eq!(result.forces[0].n_shear_planes, 2);
    assert_abs_diff_eq!(result.net_shear().y, -40_000.0, epsilon = 1e-6);
    assert!(result.max_axial() > 0.0);
}
