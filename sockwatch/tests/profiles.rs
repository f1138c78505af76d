//! Tests for profile load/save and resolution logic (non-interactive paths only)
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use sockwatch::profiles::{
    classify_change, ProfileChange, ProfileEntry, ProfileRequest, ProfilesFile, ResolveProfile,
};

// Each run gets its own XDG_CONFIG_HOME so tests never share a profiles file.
fn run_sockwatch(config_home: &Path, args: &[&str]) -> (bool, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_sockwatch"))
        .args(args)
        .env("XDG_CONFIG_HOME", config_home)
        .env_remove("SOCKWATCH_URL")
        .env_remove("SOCKWATCH_LOG")
        .output()
        .expect("run sockwatch");
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    (output.status.success(), text)
}

fn profiles_path(config_home: &Path) -> PathBuf {
    config_home.join("sockwatch").join("profiles.json")
}

fn file_with(name: &str, url: &str, tls_ca: Option<&str>) -> ProfilesFile {
    let mut pf = ProfilesFile::default();
    pf.profiles.insert(
        name.into(),
        ProfileEntry {
            url: url.into(),
            tls_ca: tls_ca.map(String::from),
        },
    );
    pf
}

#[test]
fn test_profile_created_on_first_use() {
    let td = tempfile::tempdir().unwrap();
    let (ok, out) = run_sockwatch(
        td.path(),
        &["--profile", "unittest", "http://example:1", "--dry-run"],
    );
    assert!(ok, "{out}");
    let data = fs::read_to_string(profiles_path(td.path())).expect("profiles.json created");
    assert!(
        data.contains("unittest"),
        "profiles.json missing profile entry: {data}"
    );
}

#[test]
fn test_profile_overwrite_only_when_changed() {
    let td = tempfile::tempdir().unwrap();
    run_sockwatch(td.path(), &["--profile", "prod", "http://one", "--dry-run"]);
    let first = fs::read_to_string(profiles_path(td.path())).unwrap();
    run_sockwatch(td.path(), &["--profile", "prod", "http://one", "--dry-run"]);
    let second = fs::read_to_string(profiles_path(td.path())).unwrap();
    assert_eq!(first, second, "Profile file changed despite identical input");
    // stdin is closed, so without --save the overwrite prompt reads "no"
    run_sockwatch(td.path(), &["--profile", "prod", "http://two", "--dry-run"]);
    let unchanged = fs::read_to_string(profiles_path(td.path())).unwrap();
    assert!(!unchanged.contains("two"), "overwritten without consent: {unchanged}");
    run_sockwatch(
        td.path(),
        &["--profile", "prod", "--save", "http://two", "--dry-run"],
    );
    let third = fs::read_to_string(profiles_path(td.path())).unwrap();
    assert!(third.contains("two"), "Updated URL not written: {third}");
}

#[test]
fn test_profile_tls_ca_persisted() {
    let td = tempfile::tempdir().unwrap();
    run_sockwatch(
        td.path(),
        &[
            "--profile",
            "secureX",
            "--tls-ca",
            "/tmp/cert.pem",
            "https://host",
            "--dry-run",
        ],
    );
    let data = fs::read_to_string(profiles_path(td.path())).unwrap();
    assert!(data.contains("secureX"));
    assert!(data.contains("cert.pem"));
}

#[test]
fn test_saved_profile_is_loaded_by_name() {
    let td = tempfile::tempdir().unwrap();
    run_sockwatch(
        td.path(),
        &["--profile", "lab", "http://lab-host:5000", "--dry-run"],
    );
    let (ok, out) = run_sockwatch(td.path(), &["--profile", "lab", "--dry-run"]);
    assert!(ok, "{out}");
    assert!(out.contains("ws://lab-host:5000/socket.io/"), "{out}");
}

#[test]
fn test_resolve_prefers_url_over_profile() {
    let pf = file_with("a", "http://stored", None);
    let r = ProfileRequest {
        profile_name: Some("a".into()),
        url: Some("http://given".into()),
        tls_ca: None,
    }
    .resolve(&pf);
    assert_eq!(r, ResolveProfile::Direct("http://given".into(), None));
}

#[test]
fn test_resolve_loaded_lets_cli_ca_override() {
    let pf = file_with("a", "https://stored", Some("old.pem"));
    let r = ProfileRequest {
        profile_name: Some("a".into()),
        url: None,
        tls_ca: Some("new.pem".into()),
    }
    .resolve(&pf);
    assert_eq!(
        r,
        ResolveProfile::Loaded("https://stored".into(), Some("new.pem".into()))
    );
}

#[test]
fn test_resolve_prompts_when_needed() {
    let empty = ProfilesFile::default();
    assert_eq!(ProfileRequest::default().resolve(&empty), ResolveProfile::None);
    let r = ProfileRequest {
        profile_name: Some("new".into()),
        ..Default::default()
    }
    .resolve(&empty);
    assert_eq!(r, ResolveProfile::PromptCreate("new".into()));
    let pf = file_with("a", "http://x", None);
    assert_eq!(
        ProfileRequest::default().resolve(&pf),
        ResolveProfile::PromptSelect(vec!["a".into()])
    );
}

#[test]
fn test_classify_change() {
    let pf = file_with("a", "http://x", None);
    let same = ProfileEntry {
        url: "http://x".into(),
        tls_ca: None,
    };
    let moved = ProfileEntry {
        url: "http://y".into(),
        tls_ca: None,
    };
    assert_eq!(classify_change(&pf, "a", &same), ProfileChange::Unchanged);
    assert_eq!(classify_change(&pf, "a", &moved), ProfileChange::Changed);
    assert_eq!(classify_change(&pf, "b", &same), ProfileChange::New);
}
