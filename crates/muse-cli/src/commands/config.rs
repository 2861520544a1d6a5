use muse_core::config::{SupabaseConfig, AUTH_CALLBACK_PATH};
use muse_core::util::normalize_text_option;

use crate::cli::ConfigCommands;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            profile,
            supabase_url,
            supabase_anon_key,
            redirect_url,
            no_activate,
        } => run_config_init(
            profile.as_deref().or(global_profile),
            supabase_url,
            supabase_anon_key,
            redirect_url,
            no_activate,
        ),
    }
}

/// Merge explicit values over the stored profile, validate what is complete
/// and save.
pub fn run_config_init(
    profile_name: Option<&str>,
    supabase_url: Option<String>,
    supabase_anon_key: Option<String>,
    redirect_url: Option<String>,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load()?;
    let profile_name = config.resolve_profile_name(profile_name);

    let profile = config.profile_mut_or_default(&profile_name);
    if let Some(url) = normalize_text_option(supabase_url) {
        profile.supabase_url = Some(url);
    }
    if let Some(key) = normalize_text_option(supabase_anon_key) {
        profile.supabase_anon_key = Some(key);
    }
    if let Some(redirect) = normalize_text_option(redirect_url) {
        if !redirect.trim_end_matches('/').ends_with(AUTH_CALLBACK_PATH) {
            tracing::warn!(
                "Redirect URL {} does not end in {}; verification links may not complete",
                redirect,
                AUTH_CALLBACK_PATH
            );
        }
        profile.redirect_url = Some(redirect);
    }

    let missing = profile.missing_fields();
    if missing.is_empty() {
        SupabaseConfig::new(
            profile.supabase_url.clone().unwrap_or_default(),
            profile.supabase_anon_key.clone().unwrap_or_default(),
            profile.redirect_url.clone(),
        )?;
    }

    if !no_activate || config.active_profile.is_none() {
        config.active_profile = Some(profile_name.clone());
    }
    let path = config.save()?;

    println!("Saved profile '{profile_name}' to {}", path.display());
    if missing.is_empty() {
        println!("Next: run `muse auth login --email <EMAIL> --password <PASSWORD>`");
    } else {
        println!(
            "Profile '{profile_name}' is still missing: {}",
            missing.join(", ")
        );
    }
    Ok(())
}
