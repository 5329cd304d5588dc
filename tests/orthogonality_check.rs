mod util;
use mesh_ortho_check::geometry::orthogonality::mesh_face_orthogonality;
use mesh_ortho_check::prelude::*;
use util::*;

fn check(view: &PolyMeshView) -> (bool, OrthogonalityReport, String) {
    let checker = OrthogonalityChecker::default();
    let mut out = Vec::new();
    let failed = checker
        .check_face_orthogonality_to(view, &NoComm, true, None, &mut out)
        .unwrap();
    let report = checker.evaluate(view, &NoComm, None).unwrap();
    (failed, report, String::from_utf8(out).unwrap())
}

#[test]
fn orthogonal_face_lands_in_first_bin() {
    let (failed, report, text) = check(&faces_with_metrics(&[1.0]));
    assert!(!failed);
    assert_eq!(report.bins[0].count, 1);
    assert_eq!(report.n_binned(), 1);
    assert_eq!(report.n_severe, 0);
    assert_eq!(report.n_errors, 0);
    assert_eq!(report.max_angle_deg(), Some(0.0));
    assert!(text.contains("    Non-orthogonality check OK. No errors detected.\n"));
}

#[test]
fn face_just_past_threshold_is_severe_only() {
    let m = 70f64.to_radians().cos() - 1e-6;
    let mut set = FaceSet::new();
    let failed = OrthogonalityChecker::default()
        .check_face_orthogonality_to(
            &faces_with_metrics(&[1.0, m]),
            &NoComm,
            false,
            Some(&mut set),
            &mut std::io::sink(),
        )
        .unwrap();
    assert!(!failed);
    assert_eq!(set.to_sorted_vec(), vec![FaceId::new(1)]);

    let (_, report, text) = check(&faces_with_metrics(&[1.0, m]));
    assert_eq!(report.n_severe, 1);
    assert_eq!(report.n_errors, 0);
    assert_eq!(report.bins[7].count, 1);
    assert!(text.contains(
        "   *Number of severely non-orthogonal faces above threshold (70 deg): 1.\n"
    ));
    assert!(text.contains("Non-orthogonality check OK"));
}

#[test]
fn perpendicular_face_is_an_error() {
    let (failed, report, text) = check(&faces_with_metrics(&[0.0]));
    assert!(failed);
    assert_eq!(report.n_errors, 1);
    assert_eq!(report.n_severe, 0);
    // cos(90 deg) is a tiny positive number, so 0 falls outside every bin
    assert_eq!(report.n_binned(), 0);
    assert!(text.contains(
        " ***Non-orthogality errors present. This happens as non-orthogonality approaches 90 degrees.\n"
    ));
    assert!(text.contains(" ***Number of non-orthogonality errors: 1.\n"));
    assert!(!text.contains("check OK"));
}

#[test]
fn zero_area_face_is_absorbed_and_flagged() {
    let view = PolyMeshView::from_labels(
        vec![[0.0; 3], [1.0, 0.0, 0.0]],
        vec![[0.0; 3]],
        &[0],
        &[1],
    )
    .unwrap();
    let (failed, report, _) = check(&view);
    assert!(failed);
    assert_eq!(report.min_metric, 0.0);
    assert!(report.max_angle_deg().unwrap().is_finite());
}

#[test]
fn average_of_three_faces() {
    let (_, report, _) = check(&faces_with_metrics(&[1.0, 0.9, 0.8]));
    let avg = report.average_angle_deg().unwrap();
    assert!(approx_eq(avg, 0.9f64.acos().to_degrees(), 1e-12), "{avg}");
    let max = report.max_angle_deg().unwrap();
    assert!(approx_eq(max, 0.8f64.acos().to_degrees(), 1e-12), "{max}");
    assert_eq!(report.bins[0].count, 1);
    assert_eq!(report.bins[2].count, 1);
    assert_eq!(report.bins[3].count, 1);
}

#[test]
fn no_internal_faces() {
    let view = PolyMeshView::from_labels(vec![[0.0; 3]], vec![], &[], &[]).unwrap();
    let (failed, report, text) = check(&view);
    assert!(!failed);
    assert_eq!(report.n_faces, 0);
    assert_eq!(report.average_angle_deg(), None);
    assert!(text.contains("    Number of internal faces: 0\n"));
    assert!(!text.contains("average"));
    assert!(!text.contains("NaN") && !text.contains("inf"));
}

#[test]
fn binned_plus_excluded_equals_face_count() {
    let checker = OrthogonalityChecker::default();
    let lowest = checker.classifier().bins().lower_bound(8);
    for seed in 0..8 {
        let view = random_view(12, 40, seed);
        let report = checker.evaluate(&view, &NoComm, None).unwrap();
        let excluded = view
            .internal_faces()
            .map(|f| mesh_face_orthogonality(&view, f, checker.config().stabilizer))
            .filter(|&m| m < lowest)
            .count() as u64;
        assert_eq!(report.n_binned() + excluded, report.n_faces);
        assert_eq!(report.n_faces, 40);
    }
}

#[test]
fn report_is_silent_when_disabled() {
    let mut out = Vec::new();
    let failed = OrthogonalityChecker::default()
        .check_face_orthogonality_to(&faces_with_metrics(&[0.0]), &NoComm, false, None, &mut out)
        .unwrap();
    assert!(failed);
    assert!(out.is_empty());
}

#[test]
fn sheared_block_matches_analytic_angle() {
    // x and y faces tilt by atan(shear); z faces stay orthogonal
    let view = sheared_block([3, 3, 2], 1.0).to_view().unwrap();
    let (failed, report, text) = check(&view);
    assert!(!failed);
    assert_eq!(report.n_faces, 33);
    assert_eq!(report.bins[0].count, 9);
    assert_eq!(report.bins[4].count, 24);
    assert!(approx_eq(report.max_angle_deg().unwrap(), 45.0, 1e-9));
    assert!(text.contains("    Mesh non-orthogonality Max: 45 average: "));

    let steep = sheared_block([3, 3, 2], 75f64.to_radians().tan())
        .to_view()
        .unwrap();
    let (failed, report, _) = check(&steep);
    assert!(!failed);
    assert_eq!(report.n_severe, 24);
    assert_eq!(report.bins[7].count, 24);
}

#[test]
fn config_from_json() {
    let cfg: OrthogonalityConfig =
        serde_json::from_str(r#"{ "severe_threshold_deg": 60.0 }"#).unwrap();
    assert_eq!(cfg.n_bins, 9);
    assert_eq!(cfg.bin_width_deg, 10.0);
    let checker = OrthogonalityChecker::new(cfg).unwrap();
    let report = checker
        .evaluate(
            &faces_with_metrics(&[65f64.to_radians().cos()]),
            &NoComm,
            None,
        )
        .unwrap();
    assert_eq!(report.n_severe, 1);
    assert_eq!(report.severe_threshold_deg, 60.0);

    let bad: OrthogonalityConfig = serde_json::from_str(r#"{ "n_bins": 0 }"#).unwrap();
    assert!(matches!(
        OrthogonalityChecker::new(bad),
        Err(MeshCheckError::InvalidConfig(_))
    ));
}

#[test]
fn threshold_past_right_angle_is_rejected() {
    let cfg: OrthogonalityConfig =
        serde_json::from_str(r#"{ "severe_threshold_deg": 100.0 }"#).unwrap();
    assert!(matches!(
        OrthogonalityChecker::new(cfg),
        Err(MeshCheckError::InvalidConfig(_))
    ));
    let cfg: OrthogonalityConfig =
        serde_json::from_str(r#"{ "degenerate_guard": 0.5 }"#).unwrap();
    assert!(matches!(
        OrthogonalityChecker::new(cfg),
        Err(MeshCheckError::InvalidConfig(_))
    ));

    // faces at and beyond 90 degrees always fail under an accepted config
    let (failed, report, text) = check(&faces_with_metrics(&[0.0, -0.1]));
    assert!(failed);
    assert_eq!(report.n_errors, 2);
    assert!(!text.contains("check OK"));

    // a 72.5 degree face is severe, not an error
    let (failed, report, _) = check(&faces_with_metrics(&[0.3]));
    assert!(!failed);
    assert_eq!(report.n_severe, 1);
    assert_eq!(report.n_errors, 0);
}

#[cfg(feature = "rayon")]
#[test]
fn parallel_pass_matches_sequential() {
    let checker = OrthogonalityChecker::default();
    let view = random_view(50, 400, 7);
    let mut seq_set = FaceSet::new();
    let mut par_set = FaceSet::new();
    let seq = checker.evaluate(&view, &NoComm, Some(&mut seq_set)).unwrap();
    let par = checker
        .evaluate_par(&view, &NoComm, Some(&mut par_set))
        .unwrap();
    assert_eq!(seq.bins, par.bins);
    assert_eq!(seq.n_errors, par.n_errors);
    assert_eq!(seq.n_severe, par.n_severe);
    assert_eq!(seq.min_metric, par.min_metric);
    assert!(approx_eq(seq.sum_metric, par.sum_metric, 1e-12));
    assert_eq!(seq_set, par_set);
}
