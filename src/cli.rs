//! Command line surface: arguments, interactive prompts and option resolution.
//!
//! Anything missing on the command line falls back to the environment, then
//! the config file, then an interactive prompt. The exporter only ever sees
//! the resolved [`ExportSettings`].

use crate::config::Config;
use crate::contacts::{Credentials, ExportOptions, GDataSettings};
use anyhow::{Result, anyhow};
use clap::Parser;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use secrecy::SecretString;
use std::path::PathBuf;

/// contacts-vcf - export your address book to a vCard (VCF) file
#[derive(Debug, Parser)]
#[command(name = "contacts-vcf")]
#[command(about = "Export your address book to a vCard (VCF) file", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Full account e-mail address
    #[arg(short = 'u', long, env = "CONTACTS_VCF_USER")]
    pub user: Option<String>,

    /// Account password
    #[arg(short = 'p', long, env = "CONTACTS_VCF_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// OAuth access token, used instead of user and password
    #[arg(long, env = "CONTACTS_VCF_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// VCard file to write to
    #[arg(short = 'f', long)]
    pub filename: Option<PathBuf>,

    /// Dump contact pictures in this folder
    #[arg(long)]
    pub pics: Option<PathBuf>,

    /// Contacts fetched per feed request
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=999))]
    pub page_size: Option<u32>,

    /// Base URL of the contacts feed
    #[arg(long)]
    pub base_url: Option<String>,

    /// URL of the password login endpoint
    #[arg(long)]
    pub login_url: Option<String>,

    /// Read configuration from this file instead of the default location
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Everything the export needs, with no interactive step left
#[derive(Debug)]
pub struct ExportSettings {
    pub credentials: Credentials,
    pub gdata: GDataSettings,
    pub output: PathBuf,
    pub export: ExportOptions,
}

/// Source of answers for missing options
pub trait Prompter {
    fn prompt(&mut self, message: &str) -> Result<String>;

    /// Like [`Prompter::prompt`], without echoing the answer
    fn prompt_secret(&mut self, message: &str) -> Result<String>;
}

/// Prompts on the terminal through rustyline; secrets are read with rpassword
pub struct TerminalPrompter {
    editor: DefaultEditor,
}

impl TerminalPrompter {
    pub fn new() -> Result<Self> {
        Ok(Self { editor: DefaultEditor::new()? })
    }
}

impl Prompter for TerminalPrompter {
    fn prompt(&mut self, message: &str) -> Result<String> {
        match self.editor.readline(message) {
            Ok(line) => Ok(line.trim().to_string()),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                Err(anyhow!("Input aborted"))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn prompt_secret(&mut self, message: &str) -> Result<String> {
        Ok(rpassword::prompt_password(message)?)
    }
}

/// Asks until a non-empty answer is given
fn prompt_until_set<F>(mut ask: F, blank_notice: Option<&str>) -> Result<String>
where
    F: FnMut() -> Result<String>,
{
    loop {
        let answer = ask()?;
        if !answer.is_empty() {
            return Ok(answer);
        }
        if let Some(notice) = blank_notice {
            println!("{}", notice);
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Merges command line, config file and prompts into [`ExportSettings`].
///
/// A token makes the username and password unnecessary.
pub fn resolve_settings(
    cli: Cli,
    config: &Config,
    prompter: &mut dyn Prompter,
) -> Result<ExportSettings> {
    let credentials = match non_empty(cli.token) {
        Some(token) => Credentials::Token(SecretString::from(token)),
        None => {
            let user = match non_empty(cli.user).or_else(|| non_empty(config.account.user.clone()))
            {
                Some(user) => user,
                None => {
                    prompt_until_set(|| prompter.prompt("Please enter your username: "), None)?
                }
            };
            let password = match non_empty(cli.password) {
                Some(password) => password,
                None => prompt_until_set(
                    || prompter.prompt_secret("Please enter your password: "),
                    Some("Password cannot be blank."),
                )?,
            };
            Credentials::Password { user, password: SecretString::from(password) }
        }
    };

    let output = match cli.filename.or_else(|| config.export.filename.clone()) {
        Some(path) => path,
        None => PathBuf::from(prompt_until_set(
            || prompter.prompt("Please enter the VCard file: "),
            None,
        )?),
    };

    let gdata = GDataSettings {
        base_url: cli.base_url.unwrap_or_else(|| config.account.base_url.clone()),
        login_url: cli.login_url.unwrap_or_else(|| config.account.login_url.clone()),
    };

    let export = ExportOptions {
        photo_dir: cli.pics.or_else(|| config.export.photo_dir.clone()),
        page_size: cli.page_size.unwrap_or(config.export.page_size),
    };

    Ok(ExportSettings { credentials, gdata, output, export })
}
