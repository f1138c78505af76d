//! Command-line and environment settings.

use crate::history::DEFAULT_HISTORY;

pub const ENV_URL: &str = "SOCKWATCH_URL";
pub const ENV_HISTORY: &str = "SOCKWATCH_HISTORY";
pub const ENV_LOG: &str = "SOCKWATCH_LOG";

const MIN_HISTORY: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    pub url: Option<String>,
    pub tls_ca: Option<String>,
    pub profile: Option<String>,
    pub save: bool,
    pub dry_run: bool,
    pub history: Option<usize>,
}

/// Why parsing stopped without producing args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliExit {
    Help(String),
    Invalid(String),
}

pub fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} [--tls-ca CERT_PEM|-t CERT_PEM] [--profile NAME|-P NAME] [--save] [--history N] [--dry-run] [http://HOST:PORT]\n\
         \n\
         Environment:\n  \
           {ENV_URL}      collector URL when none is given\n  \
           {ENV_HISTORY}  samples kept per chart (default {DEFAULT_HISTORY})\n  \
           {ENV_LOG}      tracing filter; logs go to the config dir"
    )
}

pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<ParsedArgs, CliExit> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "sockwatch".into());
    let mut out = ParsedArgs::default();
    let mut help = false;

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => help = true,
            "--tls-ca" | "-t" => out.tls_ca = it.next(),
            "--profile" | "-P" => out.profile = it.next(),
            "--save" => out.save = true,
            "--dry-run" => out.dry_run = true,
            "--history" => {
                let v = it.next().unwrap_or_default();
                out.history = Some(parse_history(&v, &prog)?);
            }
            _ if arg.starts_with("--tls-ca=") => {
                out.tls_ca = value_of(&arg);
            }
            _ if arg.starts_with("--profile=") => {
                out.profile = value_of(&arg);
            }
            _ if arg.starts_with("--history=") => {
                let v = value_of(&arg).unwrap_or_default();
                out.history = Some(parse_history(&v, &prog)?);
            }
            _ if arg.starts_with('-') => {
                return Err(CliExit::Invalid(format!(
                    "Unknown option {arg}. {}",
                    usage(&prog)
                )));
            }
            _ => {
                if out.url.is_none() {
                    out.url = Some(arg);
                } else {
                    return Err(CliExit::Invalid(format!(
                        "Unexpected argument. {}",
                        usage(&prog)
                    )));
                }
            }
        }
    }
    if help {
        return Err(CliExit::Help(usage(&prog)));
    }
    Ok(out)
}

fn value_of(arg: &str) -> Option<String> {
    arg.split_once('=')
        .map(|(_, v)| v.to_string())
        .filter(|v| !v.is_empty())
}

fn parse_history(v: &str, prog: &str) -> Result<usize, CliExit> {
    v.parse::<usize>()
        .map_err(|_| CliExit::Invalid(format!("--history expects a number. {}", usage(prog))))
}

/// CLI value, then the environment, then the default; never below two samples.
pub fn history_len(cli: Option<usize>, env: Option<&str>) -> usize {
    cli.or_else(|| env.and_then(|v| v.trim().parse().ok()))
        .unwrap_or(DEFAULT_HISTORY)
        .max(MIN_HISTORY)
}

pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
