//! Environment knobs, read through one place so tests can bypass them.

pub(crate) const ENV_MODE: &str = "MECHVIZ_ENV";
pub(crate) const ENV_HOST: &str = "MECHVIZ_HOST";
pub(crate) const ENV_VALIDATE: &str = "MECHVIZ_VALIDATE";
pub(crate) const ENV_FIT_CACHE_CAPACITY: &str = "MECHVIZ_FIT_CACHE_CAPACITY";

pub(crate) fn var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

pub(crate) fn positive_usize(name: &str) -> Option<usize> {
    var(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
}

/// `0`, `false`, `off` and `no` (any case) read as an explicit opt-out.
pub(crate) fn is_switched_off(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "off" | "no"
    )
}
