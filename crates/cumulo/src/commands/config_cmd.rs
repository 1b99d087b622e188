//! Configuration command handlers (no tenant connection required).

use cumulo_config::Profile;
use dialoguer::{Confirm, Input};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),
        ConfigCommand::Show => show(global),
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }
        ConfigCommand::Profiles => profiles(global),
        ConfigCommand::SetPassword { profile } => set_password(profile, global),
    }
}

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load_config_or_default();

    let name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(dialoguer_err)?;

    let url: String = Input::new()
        .with_prompt("Tenant URL (e.g. https://acme.cumulocity.com)")
        .interact_text()
        .map_err(dialoguer_err)?;

    let tenant: String = Input::new()
        .with_prompt("Tenant ID (empty if encoded in the URL)")
        .allow_empty(true)
        .interact_text()
        .map_err(dialoguer_err)?;

    let username: String = Input::new()
        .with_prompt("Username")
        .interact_text()
        .map_err(dialoguer_err)?;

    let mut profile = Profile {
        url,
        tenant: (!tenant.is_empty()).then_some(tenant),
        username: Some(username),
        ..Profile::default()
    };

    let use_keyring = Confirm::new()
        .with_prompt("Store the password in the system keyring?")
        .default(true)
        .interact()
        .map_err(dialoguer_err)?;

    let password = rpassword::prompt_password("Password: ")?;
    if use_keyring {
        cumulo_config::store_password(&name, &password)?;
    } else {
        profile.password = Some(password);
        eprintln!("note: password stored in plaintext in the config file");
    }

    if cfg.default_profile.is_none() {
        cfg.default_profile = Some(name.clone());
    }
    cfg.profiles.insert(name.clone(), profile);
    config::save_config(&cfg)?;

    if !global.quiet {
        eprintln!(
            "Profile '{name}' written to {}",
            config::config_path().display()
        );
    }
    Ok(())
}

fn show(global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load_config_or_default();

    // Redact before printing.
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some("<redacted>".into());
        }
    }

    let toml = toml::to_string_pretty(&cfg).map_err(|e| CliError::Validation {
        field: "config".into(),
        reason: e.to_string(),
    })?;
    crate::output::print_output(&toml, global.quiet);
    Ok(())
}

fn profiles(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    let default = cfg.default_profile.as_deref().unwrap_or("");

    let mut names: Vec<&String> = cfg.profiles.keys().collect();
    names.sort();

    for name in names {
        if name == default {
            println!("{name} (default)");
        } else {
            println!("{name}");
        }
    }
    if cfg.profiles.is_empty() && !global.quiet {
        eprintln!("no profiles — run: cumulo config init");
    }
    Ok(())
}

fn set_password(profile: Option<String>, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    let name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));

    if !cfg.profiles.contains_key(&name) {
        let mut available: Vec<&String> = cfg.profiles.keys().collect();
        available.sort();
        return Err(CliError::ProfileNotFound {
            name,
            available: available
                .into_iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
        });
    }

    let password = rpassword::prompt_password("Password: ")?;
    cumulo_config::store_password(&name, &password)?;

    if !global.quiet {
        eprintln!("Password stored in keyring for profile '{name}'");
    }
    Ok(())
}

fn dialoguer_err(e: dialoguer::Error) -> CliError {
    match e {
        dialoguer::Error::IO(io) => CliError::Io(io),
    }
}
