use super::*;

#[test]
fn clamp_unit_handles_nan_and_out_of_range() {
    assert_eq!(clamp_unit(f64::NAN), 0.0);
    assert_eq!(clamp_unit(-0.5), 0.0);
    assert_eq!(clamp_unit(1.5), 1.0);
    assert_eq!(clamp_unit(f64::INFINITY), 1.0);
    assert_eq!(clamp_unit(0.25), 0.25);
}

#[test]
fn stable_hasher_is_deterministic() {
    let digest = |s: &str| {
        let mut h = StableHasher::new();
        h.write_str(s);
        h.write_f64(1.5);
        h.finish()
    };
    assert_eq!(digest("abc"), digest("abc"));
    assert_ne!(digest("abc"), digest("abd"));
}

#[test]
fn string_writes_are_length_prefixed() {
    let mut a = StableHasher::new();
    a.write_str("ab");
    a.write_str("c");
    let mut b = StableHasher::new();
    b.write_str("a");
    b.write_str("bc");
    assert_ne!(a.finish(), b.finish());
}

#[test]
fn json_hash_distinguishes_types() {
    let mut a = StableHasher::new();
    a.write_json(&serde_json::json!("1"));
    let mut b = StableHasher::new();
    b.write_json(&serde_json::json!(1));
    assert_ne!(a.finish(), b.finish());
}

#[test]
fn number_like_accepts_numbers_strings_and_bools() {
    use serde_json::json;
    assert_eq!(number_like(&json!(3.5)), Some(3.5));
    assert_eq!(number_like(&json!(" 12 ")), Some(12.0));
    assert_eq!(number_like(&json!(true)), Some(1.0));
    assert_eq!(number_like(&json!("")), None);
    assert_eq!(number_like(&json!("abc")), None);
    assert_eq!(number_like(&json!("inf")), None);
    assert_eq!(number_like(&json!(null)), None);
    assert_eq!(number_like(&json!([1])), None);
}
