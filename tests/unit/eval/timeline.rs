use super::*;

#[test]
fn step_index_is_monotone_and_covers_every_step() {
    for n in 1..=7u32 {
        let mut last = 0;
        let mut seen = std::collections::BTreeSet::new();
        for i in 0..=1000 {
            let r = f64::from(i) / 1000.0;
            let s = active_step_index(n, r);
            assert!(s >= last, "n={n} r={r}");
            assert!(s < n);
            seen.insert(s);
            last = s;
        }
        assert_eq!(seen.len(), n as usize);
        assert_eq!(active_step_index(n, 1.0), n - 1);
    }
}

#[test]
fn out_of_range_progress_is_clamped() {
    assert_eq!(active_step_index(3, -2.0), 0);
    assert_eq!(active_step_index(3, 9.0), 2);
    assert_eq!(active_step_index(3, f64::NAN), 0);
    assert_eq!(active_step_index(0, 0.7), 0);
}

#[test]
fn cursor_reports_within_step_progress() {
    let c = step_cursor(3, 0.5);
    assert_eq!(c.step_index, 1);
    assert!((c.step_progress - 0.5).abs() < 1e-12);
    assert_eq!(c.badge(), "Step 2/3");
    assert!(!c.is_last());

    let end = step_cursor(3, 1.0);
    assert_eq!(end.step_index, 2);
    assert_eq!(end.step_progress, 1.0);
    assert!(end.is_last());

    assert_eq!(step_cursor(0, 0.3).step_count, 1);
}
