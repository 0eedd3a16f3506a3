use super::*;

#[test]
fn explicit_opt_out_always_wins() {
    assert!(!should_validate(true, None, None));
    assert!(!should_validate(true, Some("development"), Some("localhost")));
}

#[test]
fn on_by_default_outside_production() {
    assert!(should_validate(false, None, None));
    assert!(should_validate(false, Some("staging"), Some("example.org")));
}

#[test]
fn production_only_validates_on_local_hosts() {
    assert!(!should_validate(false, Some("Production"), Some("mechanisms.example.org")));
    assert!(should_validate(false, Some("production"), Some("localhost")));
    assert!(should_validate(false, Some("production"), Some("127.0.0.1")));
    assert!(should_validate(false, Some("production"), Some("")));
    assert!(should_validate(false, Some("production"), None));
}

#[test]
fn fixed_gates() {
    assert!(ValidationGate::always().is_enabled());
    assert!(!ValidationGate::never().is_enabled());
    assert_eq!(ValidationGate::default(), ValidationGate::always());
}
