pub mod cli;
pub mod config;
pub mod contacts;
pub mod env_manager;
pub mod vcard;

use std::io::Write;

/// Logger used by the binary: `RUST_LOG` overrides the default `info` filter
pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            use chrono::Local;
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}

// Re-export commonly used types
pub use config::Config;
pub use contacts::{ContactMapper, ContactsError, ContactsService, GroupTable};
pub use vcard::VCard;
