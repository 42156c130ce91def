use anyhow::{Context, Result};
use clap::Parser;
use contacts_vcf::cli::{Cli, TerminalPrompter, resolve_settings};
use contacts_vcf::config::Config;
use contacts_vcf::contacts::{ContactMapper, ContactsError, GDataClient};
use contacts_vcf::env_manager::{self, CREDENTIAL_ENV_VARS};
use log::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    // .env may carry RUST_LOG, so it is read before the logger starts
    let env_file = env_manager::load_env_file();
    contacts_vcf::init_logger();

    match env_file {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => debug!("No .env file found or error loading it: {}", e),
    }
    for var in CREDENTIAL_ENV_VARS {
        if env_manager::get_env_var(var).is_some() {
            debug!("{} is set", var);
        }
    }

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let mut prompter = TerminalPrompter::new()?;
    let settings = resolve_settings(cli, &config, &mut prompter)?;

    let client = match GDataClient::login(&settings.gdata, &settings.credentials).await {
        Ok(client) => client,
        Err(e) if e.is_authentication() => {
            report_invalid_credentials(&e);
            return Ok(());
        }
        Err(e) => return Err(e).context("Failed to connect to the contacts service"),
    };

    let mapper = ContactMapper::new(client, settings.export);

    // Token credentials are first checked by the groups request; past this
    // point an authentication error is a failed request, not bad credentials.
    let groups = match mapper.list_groups().await {
        Ok(groups) => groups,
        Err(e) if e.is_authentication() => {
            report_invalid_credentials(&e);
            return Ok(());
        }
        Err(e) => return Err(e).context("Failed to read contact groups"),
    };

    mapper.write_contacts(&groups, &settings.output).await.with_context(|| {
        format!("Failed to export contacts to {}", settings.output.display())
    })?;
    Ok(())
}

fn report_invalid_credentials(err: &ContactsError) {
    debug!("{}", err);
    println!("Invalid user credentials given.");
}
