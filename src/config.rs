use data_encoding::BASE64;
use log::{error, info};
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::{
    error::Result,
    privacy::{HmacSecret, NameKey, Secrets},
    service::{services, Balloting, Registry},
};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    #[serde(default)]
    candidates: Vec<String>,
    // secrets
    hmac_secret: String,
    name_key: String,
}

impl Config {
    /// Names of the candidates standing in this election, registered in
    /// order when the server ignites.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Validate and decode the key material.
    ///
    /// `name_key` is standard base64 of exactly 32 bytes.
    pub fn secrets(&self) -> Result<Secrets> {
        let name_key = BASE64.decode(self.name_key.trim().as_bytes())?;
        Ok(Secrets {
            hmac_secret: HmacSecret::new(self.hmac_secret.as_bytes())?,
            name_key: NameKey::from_slice(&name_key)?,
        })
    }
}

/// A fairing that loads the application config and puts it in managed state.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// A fairing that builds the voting store and both services from the loaded
/// [`Config`], registers the configured candidates, and places a [`Registry`]
/// and a [`Balloting`] into managed state.
///
/// Must be attached after [`ConfigFairing`].
pub struct ElectionFairing;

#[rocket::async_trait]
impl Fairing for ElectionFairing {
    fn info(&self) -> Info {
        Info {
            name: "Election",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        let Some(config) = rocket.state::<Config>() else {
            error!("Application config is not loaded");
            return Err(rocket);
        };

        // Fail fast on bad key material; there is no default key.
        let secrets = match config.secrets() {
            Ok(secrets) => secrets,
            Err(e) => {
                error!("Invalid election secrets: {e}");
                return Err(rocket);
            }
        };
        let (registry, balloting) = match services(&secrets) {
            Ok(services) => services,
            Err(e) => {
                error!("Failed to set up the election: {e}");
                return Err(rocket);
            }
        };

        for name in config.candidates() {
            registry.register_candidate(name);
        }
        info!(
            "Election ready with {} candidate(s)",
            registry.get_all_candidates().len()
        );

        // Manage the state.
        rocket = rocket.manage::<Registry>(registry).manage::<Balloting>(balloting);
        Ok(rocket)
    }
}
