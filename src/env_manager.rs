use std::env;
use std::path::PathBuf;

pub const USER_ENV: &str = "CONTACTS_VCF_USER";
pub const PASSWORD_ENV: &str = "CONTACTS_VCF_PASSWORD";
pub const TOKEN_ENV: &str = "CONTACTS_VCF_TOKEN";

/// Variables read from the environment or `.env`
pub const CREDENTIAL_ENV_VARS: &[&str] = &[USER_ENV, PASSWORD_ENV, TOKEN_ENV];

/// Loads `.env` from the current directory or its parents.
///
/// Runs before the logger is set up, so the outcome is returned for the caller to log.
pub fn load_env_file() -> Result<PathBuf, dotenvy::Error> {
    dotenvy::dotenv()
}

/// Value of an environment variable, `None` if unset or blank
pub fn get_env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_variables_are_missing() {
        assert_eq!(get_env_var("CONTACTS_VCF_SURELY_UNSET_VARIABLE"), None);
    }

    #[test]
    fn credential_vars_listed() {
        assert!(CREDENTIAL_ENV_VARS.contains(&"CONTACTS_VCF_TOKEN"));
        assert_eq!(CREDENTIAL_ENV_VARS.len(), 3);
    }
}
