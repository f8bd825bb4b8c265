#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use crate::config::{ConfigFairing, ElectionFairing};
use crate::logging::LoggerFairing;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod privacy;
pub mod service;

/// Build the server from `Rocket.toml` and `ROCKET_*` environment variables.
pub fn build() -> Rocket<Build> {
    with_fairings(rocket::build())
}

fn with_fairings(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .mount("/", api::routes())
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(ElectionFairing)
}

/// A server with freshly generated secrets and no candidates, isolated from
/// any `Rocket.toml` or environment.
#[cfg(test)]
pub(crate) fn rocket_for_test() -> Rocket<Build> {
    use data_encoding::BASE64;
    use rand::{distributions::Alphanumeric, Rng, RngCore};
    use rocket::figment::Figment;

    let mut rng = rand::thread_rng();
    let hmac_secret: String = (&mut rng)
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    let mut name_key = [0u8; privacy::NAME_KEY_LEN];
    rng.fill_bytes(&mut name_key);

    let figment = Figment::from(rocket::Config::debug_default())
        .merge(("hmac_secret", hmac_secret))
        .merge(("name_key", BASE64.encode(&name_key)));
    with_fairings(rocket::custom(figment))
}
