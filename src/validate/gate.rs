use crate::foundation::env;

/// Whether dev-mode validation runs.
///
/// On unless explicitly disabled, or a production environment is signalled on a non-local host.
pub fn should_validate(disabled: bool, env_mode: Option<&str>, host: Option<&str>) -> bool {
    if disabled {
        return false;
    }
    let production = env_mode.is_some_and(|m| m.trim().eq_ignore_ascii_case("production"));
    if !production {
        return true;
    }
    matches!(
        host.map(str::trim).unwrap_or_default(),
        "" | "localhost" | "127.0.0.1"
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidationGate {
    enabled: bool,
}

impl Default for ValidationGate {
    fn default() -> Self {
        Self::always()
    }
}

impl ValidationGate {
    pub fn always() -> Self {
        Self { enabled: true }
    }

    pub fn never() -> Self {
        Self { enabled: false }
    }

    /// Read `MECHVIZ_VALIDATE`, `MECHVIZ_ENV` and `MECHVIZ_HOST`.
    pub fn from_env() -> Self {
        let disabled = env::var(env::ENV_VALIDATE).is_some_and(|v| env::is_switched_off(&v));
        let mode = env::var(env::ENV_MODE);
        let host = env::var(env::ENV_HOST);
        Self {
            enabled: should_validate(disabled, mode.as_deref(), host.as_deref()),
        }
    }

    pub fn is_enabled(self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
#[path = "../../tests/unit/validate/gate.rs"]
mod tests;
