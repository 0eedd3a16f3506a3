use xxhash_rust::xxh3::Xxh3;

const XXH3_SEED: u64 = 0x5d1c_8a37_e4b2_9f61;

/// Clamp into `[0, 1]`, mapping NaN to 0.
pub fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Float comparison with an absolute tolerance.
pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

/// Lenient numeric read of a JSON value: numbers, numeric strings (trimmed, empty is rejected)
/// and booleans as 1/0. Non-finite results are `None`.
pub fn number_like(v: &serde_json::Value) -> Option<f64> {
    let n = match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => {
            let s = s.trim();
            if s.is_empty() { None } else { s.parse::<f64>().ok() }
        }
        serde_json::Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

/// Stable content hasher for cache keys.
///
/// Field writes are length/tag-prefixed so adjacent strings cannot alias.
pub(crate) struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    pub(crate) fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    pub(crate) fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    pub(crate) fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    pub(crate) fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    pub(crate) fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    pub(crate) fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes());
    }

    pub(crate) fn write_opt_u32(&mut self, v: Option<u32>) {
        match v {
            Some(v) => {
                self.write_u8(1);
                self.write_u32(v);
            }
            None => self.write_u8(0),
        }
    }

    pub(crate) fn write_opt_str(&mut self, v: Option<&str>) {
        match v {
            Some(s) => {
                self.write_u8(1);
                self.write_str(s);
            }
            None => self.write_u8(0),
        }
    }

    pub(crate) fn write_json(&mut self, v: &serde_json::Value) {
        match v {
            serde_json::Value::Null => self.write_u8(0),
            serde_json::Value::Bool(x) => {
                self.write_u8(1);
                self.write_bool(*x);
            }
            serde_json::Value::Number(n) => {
                self.write_u8(2);
                self.write_str(&n.to_string());
            }
            serde_json::Value::String(s) => {
                self.write_u8(3);
                self.write_str(s);
            }
            serde_json::Value::Array(items) => {
                self.write_u8(4);
                self.write_u64(items.len() as u64);
                for item in items {
                    self.write_json(item);
                }
            }
            serde_json::Value::Object(map) => {
                self.write_u8(5);
                self.write_u64(map.len() as u64);
                for (k, item) in map {
                    self.write_str(k);
                    self.write_json(item);
                }
            }
        }
    }

    pub(crate) fn finish(self) -> u64 {
        self.inner.digest()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
