//! Entry point for the sockwatch TUI. Parses args, resolves the connection profile and runs the App.

use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use sockwatch::app::App;
use sockwatch::cli::{self, CliExit, ENV_HISTORY, ENV_LOG, ENV_URL};
use sockwatch::profiles::{
    classify_change, config_dir, load_profiles, save_profiles, ProfileChange, ProfileEntry,
    ProfileRequest, ResolveProfile,
};
use sockwatch::ws::{endpoint_url, SocketClient};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let parsed = match cli::parse_args(std::env::args()) {
        Ok(v) => v,
        Err(CliExit::Help(msg)) => {
            eprintln!("{msg}");
            return Ok(ExitCode::SUCCESS);
        }
        Err(CliExit::Invalid(msg)) => {
            eprintln!("{msg}");
            return Ok(ExitCode::from(2));
        }
    };

    if let Some(filter) = cli::env_var(ENV_LOG) {
        match sockwatch::logging::init_file_logging(&filter, &config_dir()) {
            Ok(path) => info!(path = %path.display(), "logging enabled"),
            Err(e) => eprintln!("logging disabled: {e:#}"),
        }
    }

    let history = cli::history_len(parsed.history, cli::env_var(ENV_HISTORY).as_deref());

    // The environment URL only stands in when nothing on the command line names a target.
    let url = parsed.url.clone().or_else(|| {
        if parsed.profile.is_none() {
            cli::env_var(ENV_URL)
        } else {
            None
        }
    });

    let mut profiles_mut = load_profiles();
    let req = ProfileRequest {
        profile_name: parsed.profile.clone(),
        url,
        tls_ca: parsed.tls_ca.clone(),
    };

    let (url, tls_ca): (String, Option<String>) = match req.resolve(&profiles_mut) {
        ResolveProfile::Direct(u, t) => {
            if let Some(name) = parsed.profile.as_ref() {
                let entry = ProfileEntry {
                    url: u.clone(),
                    tls_ca: t.clone(),
                };
                let store = match classify_change(&profiles_mut, name, &entry) {
                    ProfileChange::New => true,
                    ProfileChange::Unchanged => false,
                    ProfileChange::Changed => {
                        parsed.save
                            || prompt_yes_no(&format!("Overwrite existing profile '{name}'? [y/N]: "))
                    }
                };
                if store {
                    profiles_mut.profiles.insert(name.clone(), entry);
                    if let Err(e) = save_profiles(&profiles_mut) {
                        warn!(error = %e, "saving profiles failed");
                        eprintln!("could not save profile '{name}': {e}");
                    }
                }
            }
            (u, t)
        }
        ResolveProfile::Loaded(u, t) => (u, t),
        ResolveProfile::PromptSelect(names) => {
            eprintln!("Select profile:");
            for (i, n) in names.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, n);
            }
            let line = prompt_string("Enter number (or blank to abort): ")?;
            let picked = line
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|idx| idx.checked_sub(1))
                .and_then(|idx| names.get(idx))
                .and_then(|name| profiles_mut.profiles.get(name));
            match picked {
                Some(entry) => (
                    entry.url.clone(),
                    parsed.tls_ca.clone().or_else(|| entry.tls_ca.clone()),
                ),
                None => return Ok(ExitCode::SUCCESS),
            }
        }
        ResolveProfile::PromptCreate(name) => {
            eprintln!("Profile '{name}' does not exist yet.");
            let url = prompt_string("Enter collector URL (http://HOST:PORT): ")?;
            if url.trim().is_empty() {
                return Ok(ExitCode::SUCCESS);
            }
            let ca_opt = match parsed.tls_ca.clone() {
                Some(ca) => Some(ca),
                None => {
                    let ca = prompt_string("Enter TLS CA path (or leave blank): ")?;
                    Some(ca.trim().to_string()).filter(|c| !c.is_empty())
                }
            };
            profiles_mut.profiles.insert(
                name.clone(),
                ProfileEntry {
                    url: url.trim().to_string(),
                    tls_ca: ca_opt.clone(),
                },
            );
            save_profiles(&profiles_mut)?;
            (url.trim().to_string(), ca_opt)
        }
        ResolveProfile::None => {
            eprintln!("No URL provided and no profiles to select. Pass a URL or set {ENV_URL}.");
            return Ok(ExitCode::from(2));
        }
    };

    if parsed.dry_run {
        let endpoint = endpoint_url(&url)?;
        println!("{endpoint}");
        return Ok(ExitCode::SUCCESS);
    }

    let client = SocketClient::new(&url, tls_ca.as_deref().map(Path::new))?;
    info!(endpoint = %client.endpoint(), history, "starting dashboard");
    let mut app = App::new(client, history);
    app.run().await?;
    Ok(ExitCode::SUCCESS)
}

fn prompt_yes_no(prompt: &str) -> bool {
    match prompt_string(prompt) {
        Ok(line) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

fn prompt_string(prompt: &str) -> io::Result<String> {
    eprint!("{prompt}");
    let _ = io::stderr().flush();
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line)
}
