use anyhow::{bail, Context};
use clap::Parser;
use hankkicore::api::ApiConfig;
use hankkicore::map::{HomeSettings, RuntimeOptions, StaticLocation, DEFAULT_CENTER};
use hankkicore::model::LatLng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://meal.ajou.app";

#[derive(Parser, Debug, Default)]
#[command(author, version, about = "아주한끼 desktop map client")]
pub struct Args {
    /// Load the client config from YAML
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// REST API base, e.g. http://127.0.0.1:9000 for the fixture server
    #[arg(long, env = "HANKKI_API_BASE_URL")]
    pub api_base_url: Option<String>,
    #[arg(long)]
    pub debounce_ms: Option<u64>,
    /// Let superseded fetches finish instead of aborting them
    #[arg(long, default_value_t = false)]
    pub keep_superseded: bool,
    /// "LAT,LNG", "denied" or "unavailable"
    #[arg(long)]
    pub location: Option<String>,
    /// Where the signed-in user is remembered between runs
    #[arg(long)]
    pub session_file: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub debounce_ms: u64,
    pub cancel_superseded: bool,
    pub request_timeout_secs: u64,
    pub initial_center: LatLng,
    pub initial_zoom: f64,
    pub location: StaticLocation,
    pub location_timeout_ms: u64,
    pub session_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            debounce_ms: HomeSettings::default().debounce_ms,
            cancel_superseded: true,
            request_timeout_secs: 10,
            initial_center: DEFAULT_CENTER,
            initial_zoom: 16.0,
            location: StaticLocation::default(),
            location_timeout_ms: 10_000,
            session_file: None,
        }
    }
}

impl ClientConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading client config {}", path_ref.display()))?;
        let config: ClientConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing client config {}", path_ref.display()))?;
        Ok(config)
    }

    /// YAML (when given) overridden by flags and the environment.
    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(base) = &args.api_base_url {
            config.api_base_url = base.clone();
        }
        if let Some(debounce) = args.debounce_ms {
            config.debounce_ms = debounce;
        }
        if args.keep_superseded {
            config.cancel_superseded = false;
        }
        if let Some(location) = &args.location {
            config.location = parse_location(location)?;
        }
        if let Some(path) = &args.session_file {
            config.session_file = Some(path.clone());
        }
        Ok(config)
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.api_base_url.clone(),
            timeout_secs: self.request_timeout_secs,
        }
    }

    pub fn home_settings(&self) -> HomeSettings {
        HomeSettings {
            debounce_ms: self.debounce_ms,
            initial_center: self.initial_center,
            initial_category: None,
        }
    }

    pub fn runtime_options(&self) -> RuntimeOptions {
        RuntimeOptions {
            cancel_superseded: self.cancel_superseded,
            location_timeout: Duration::from_millis(self.location_timeout_ms),
        }
    }
}

pub fn parse_location(raw: &str) -> anyhow::Result<StaticLocation> {
    match raw.trim() {
        "denied" => Ok(StaticLocation::Denied),
        "unavailable" => Ok(StaticLocation::Unavailable),
        other => {
            let Some((lat, lng)) = other.split_once(',') else {
                bail!("location must be LAT,LNG, denied or unavailable: {other}");
            };
            let lat: f64 = lat.trim().parse().context("parsing location latitude")?;
            let lng: f64 = lng.trim().parse().context("parsing location longitude")?;
            Ok(StaticLocation::Fixed { lat, lng })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"api_base_url: http://127.0.0.1:9000\ndebounce_ms: 150\nlocation:\n  mode: fixed\n  lat: 37.28\n  lng: 127.04\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = ClientConfig::load(&path).unwrap();
        assert_eq!(cfg.api_base_url, "http://127.0.0.1:9000");
        assert_eq!(cfg.home_settings().debounce_ms, 150);
        assert_eq!(cfg.location, StaticLocation::Fixed { lat: 37.28, lng: 127.04 });
        assert!(cfg.cancel_superseded);
    }

    #[test]
    fn flags_override_file_values() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"debounce_ms: 150\n").unwrap();
        let path = temp.into_temp_path();
        let args = Args {
            config: Some(path.to_path_buf()),
            debounce_ms: Some(500),
            keep_superseded: true,
            location: Some("denied".into()),
            ..Default::default()
        };
        let cfg = ClientConfig::from_args(&args).unwrap();
        assert_eq!(cfg.debounce_ms, 500);
        assert!(!cfg.runtime_options().cancel_superseded);
        assert_eq!(cfg.location, StaticLocation::Denied);
        assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn location_flag_parses_coordinates() {
        assert_eq!(
            parse_location(" 37.5, 127.0 ").unwrap(),
            StaticLocation::Fixed { lat: 37.5, lng: 127.0 }
        );
        assert!(parse_location("somewhere").is_err());
    }
}
