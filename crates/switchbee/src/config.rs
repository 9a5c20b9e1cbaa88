//! Resolution of the effective `ControllerConfig`: config file profile,
//! then `SWITCHBEE_*` env and command-line flags on top.
//!
//! Core never sees these types -- it receives a pre-built `ControllerConfig`.

use switchbee_config::{Config, Profile};
use switchbee_core::ControllerConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Build a `ControllerConfig` from the config file, profile, and CLI overrides.
pub fn build_controller_config(global: &GlobalOpts) -> Result<ControllerConfig, CliError> {
    let cfg = switchbee_config::load_config()?;
    resolve(&cfg, global)
}

fn resolve(cfg: &Config, global: &GlobalOpts) -> Result<ControllerConfig, CliError> {
    let profile_name = cfg.active_profile_name(global.profile.as_deref());

    // An explicitly requested profile must exist; the implicit default may not.
    let base = match cfg.profile(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            let mut names: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
            names.sort_unstable();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if names.is_empty() {
                    "(none)".into()
                } else {
                    names.join(", ")
                },
            });
        }
        None => Profile::default(),
    };

    let profile = apply_overrides(base, global);
    tracing::debug!(profile = %profile_name, host = ?profile.host, "resolved profile");
    Ok(switchbee_config::profile_to_controller_config(
        &profile,
        &profile_name,
        &cfg.defaults,
    )?)
}

/// Layer flag (and flag-level env) values over a profile.
pub fn apply_overrides(mut profile: Profile, global: &GlobalOpts) -> Profile {
    if let Some(ref host) = global.host {
        profile.host = Some(host.clone());
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    if let Some(ref password) = global.password {
        profile.password = Some(password.clone());
        profile.password_env = None;
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    if let Some(ref ca) = global.ca_cert {
        profile.ca_cert = Some(ca.clone());
    }
    if global.verify_tls {
        profile.verify_tls = Some(true);
    }
    if !global.include.is_empty() {
        profile.include.clone_from(&global.include);
    }
    profile
}
