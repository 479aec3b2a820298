use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::entities::{Coordinates, Lux, DEFAULT_LOCATION};
use crate::error::{config_error, Error};
use crate::sources::SIMULATED_FIX_INTERVAL;

pub const DEFAULT_API_BASE: &str = "https://maps.googleapis.com";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base: String,
    pub api_key: String,
    pub listen_addr: SocketAddr,
    pub location_interval: Duration,
    pub simulated_position: Coordinates,
    pub light_mean: Lux,
    pub light_std_dev: Lux,
}

impl Config {
    /// Reads the configuration from the environment. Call `dotenv` first to
    /// pick up a `.env` file.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GOOGLE_MAPS_API_KEY").ok_or(env::VarError::NotPresent)?;
        let api_base = lookup("GOOGLE_MAPS_API_BASE")
            .unwrap_or_else(|| DEFAULT_API_BASE.into())
            .trim_end_matches('/')
            .to_string();

        let listen_addr: SocketAddr =
            parse_or(&lookup, "MAPTRACK_LISTEN_ADDR", DEFAULT_LISTEN_ADDR.parse())?;
        let interval_ms = parse_or(
            &lookup,
            "MAPTRACK_LOCATION_INTERVAL_MS",
            Ok::<u64, Error>(SIMULATED_FIX_INTERVAL.as_millis() as u64),
        )?;
        let lat = parse_or(&lookup, "MAPTRACK_SIMULATED_LAT", Ok::<f64, Error>(DEFAULT_LOCATION.lat))?;
        let lng = parse_or(&lookup, "MAPTRACK_SIMULATED_LNG", Ok::<f64, Error>(DEFAULT_LOCATION.lng))?;
        let light_mean = parse_or(&lookup, "MAPTRACK_LIGHT_MEAN", Ok::<Lux, Error>(100.0))?;
        let light_std_dev = parse_or(&lookup, "MAPTRACK_LIGHT_STD_DEV", Ok::<Lux, Error>(20.0))?;

        if interval_ms == 0 {
            return Err(config_error("MAPTRACK_LOCATION_INTERVAL_MS"));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(config_error("MAPTRACK_SIMULATED_LAT"));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(config_error("MAPTRACK_SIMULATED_LNG"));
        }

        Ok(Self {
            api_base,
            api_key,
            listen_addr,
            location_interval: Duration::from_millis(interval_ms),
            simulated_position: Coordinates::new(lat, lng),
            light_mean,
            light_std_dev,
        })
    }
}

fn parse_or<F, T, E>(lookup: &F, name: &str, default: Result<T, E>) -> Result<T, Error>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|_| config_error(name)),
        None => default.map_err(|_| config_error(name)),
    }
}

#[test]
fn defaults_apply_when_only_key_is_set() {
    let config = Config::from_lookup(|name| match name {
        "GOOGLE_MAPS_API_KEY" => Some("secret".into()),
        _ => None,
    })
    .unwrap();

    assert_eq!(config.api_key, "secret");
    assert_eq!(config.api_base, DEFAULT_API_BASE);
    assert_eq!(config.listen_addr, "127.0.0.1:3000".parse().unwrap());
    assert_eq!(config.location_interval, SIMULATED_FIX_INTERVAL);
    assert_eq!(config.simulated_position, DEFAULT_LOCATION);
}

#[test]
fn missing_key_is_an_env_error() {
    let err = Config::from_lookup(|_| None).unwrap_err();
    assert_eq!(err.code, 1);
}

#[test]
fn rejects_unparseable_values() {
    let err = Config::from_lookup(|name| match name {
        "GOOGLE_MAPS_API_KEY" => Some("secret".into()),
        "MAPTRACK_LOCATION_INTERVAL_MS" => Some("soon".into()),
        _ => None,
    })
    .unwrap_err();

    assert_eq!(err.message, "invalid configuration value for MAPTRACK_LOCATION_INTERVAL_MS");
}

#[test]
fn strips_trailing_slash_from_api_base() {
    let config = Config::from_lookup(|name| match name {
        "GOOGLE_MAPS_API_KEY" => Some("secret".into()),
        "GOOGLE_MAPS_API_BASE" => Some("http://127.0.0.1:8080/".into()),
        _ => None,
    })
    .unwrap();

    assert_eq!(config.api_base, "http://127.0.0.1:8080");
}

#[test]
fn rejects_zero_interval_and_out_of_range_position() {
    let with = |name: &'static str, value: &'static str| {
        Config::from_lookup(move |key| match key {
            "GOOGLE_MAPS_API_KEY" => Some("secret".into()),
            key if key == name => Some(value.into()),
            _ => None,
        })
    };

    assert_eq!(
        with("MAPTRACK_LOCATION_INTERVAL_MS", "0").unwrap_err().message,
        "invalid configuration value for MAPTRACK_LOCATION_INTERVAL_MS"
    );
    assert_eq!(
        with("MAPTRACK_SIMULATED_LAT", "90.5").unwrap_err().message,
        "invalid configuration value for MAPTRACK_SIMULATED_LAT"
    );
    assert_eq!(
        with("MAPTRACK_SIMULATED_LNG", "-181").unwrap_err().message,
        "invalid configuration value for MAPTRACK_SIMULATED_LNG"
    );
    assert_eq!(
        with("MAPTRACK_SIMULATED_LAT", "NaN").unwrap_err().message,
        "invalid configuration value for MAPTRACK_SIMULATED_LAT"
    );

    let config = with("MAPTRACK_SIMULATED_LNG", "180").unwrap();
    assert_eq!(config.simulated_position.lng, 180.0);
}
