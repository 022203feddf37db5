use anyhow::Context;
use hankkicore::map::DEFAULT_CENTER;
use hankkicore::model::LatLng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Fixture server settings, from YAML or command-line flags.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub seed: u64,
    pub count: usize,
    pub center: LatLng,
    pub spread_deg: f64,
    pub latency_ms: u64,
    pub latency_jitter_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 9000,
            seed: 7,
            count: 120,
            center: DEFAULT_CENTER,
            spread_deg: 0.012,
            latency_ms: 0,
            latency_jitter_ms: 0,
        }
    }
}

impl ServerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading server config {}", path_ref.display()))?;
        let config: ServerConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing server config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn latency(&self) -> Latency {
        Latency {
            base: Duration::from_millis(self.latency_ms),
            jitter: Duration::from_millis(self.latency_jitter_ms),
        }
    }
}

/// Artificial response delay: `base` plus a uniform draw from `0..=jitter`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Latency {
    pub base: Duration,
    pub jitter: Duration,
}

impl Latency {
    pub fn is_zero(&self) -> bool {
        self.base.is_zero() && self.jitter.is_zero()
    }

    pub fn sample<R: rand::Rng>(&self, rng: &mut R) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.base;
        }
        self.base + Duration::from_millis(rng.gen_range(0..=jitter_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_load_reads_yaml_with_defaults() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"port: 9100\ncount: 12\nlatency_ms: 200\nlatency_jitter_ms: 300\n")
            .unwrap();
        let path = temp.into_temp_path();
        let cfg = ServerConfig::load(&path).unwrap();
        assert_eq!(cfg.port, 9100);
        assert_eq!(cfg.count, 12);
        assert_eq!(cfg.seed, ServerConfig::default().seed);
        assert_eq!(cfg.center, DEFAULT_CENTER);
    }

    #[test]
    fn latency_sample_stays_in_window() {
        let latency = ServerConfig {
            latency_ms: 100,
            latency_jitter_ms: 50,
            ..Default::default()
        }
        .latency();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..32 {
            let delay = latency.sample(&mut rng);
            assert!(delay >= Duration::from_millis(100) && delay <= Duration::from_millis(150));
        }
        assert!(ServerConfig::default().latency().is_zero());
    }
}
