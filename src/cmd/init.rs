//! `cors-relay init` — generate a starter configuration file.
//!
//! Writes a template config in the chosen format with the built-in
//! defaults spelled out, refusing to overwrite an existing file.

use std::path::PathBuf;

use crate::cli::{ConfigFormat, InitArgs};
use crate::error::RelayError;

#[cfg(feature = "yaml")]
const YAML_TEMPLATE: &str = "\
# cors-relay starter config. Every key is optional; the values below
# are the defaults.

listen:
  host: 0.0.0.0
  port: 3007

upstream:
  base_url: http://localhost:8080
  timeout: 30000   # milliseconds

cors:
  allow_methods: [GET, POST, PUT, DELETE, OPTIONS]
  allow_headers: [Origin, Content-Type, Accept, Authorization]

static_files:
  root: .

api_prefix: /api/
";

#[cfg(feature = "json")]
const JSON_TEMPLATE: &str = r#"{
  "listen": { "host": "0.0.0.0", "port": 3007 },
  "upstream": { "base_url": "http://localhost:8080", "timeout": 30000 },
  "cors": {
    "allow_methods": ["GET", "POST", "PUT", "DELETE", "OPTIONS"],
    "allow_headers": ["Origin", "Content-Type", "Accept", "Authorization"]
  },
  "static_files": { "root": "." },
  "api_prefix": "/api/"
}
"#;

#[cfg(feature = "toml")]
const TOML_TEMPLATE: &str = r#"# cors-relay starter config. Every key is optional; the values below
# are the defaults.

api_prefix = "/api/"

[listen]
host = "0.0.0.0"
port = 3007

[upstream]
base_url = "http://localhost:8080"
timeout = 30000   # milliseconds

[cors]
allow_methods = ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
allow_headers = ["Origin", "Content-Type", "Accept", "Authorization"]

[static_files]
root = "."
"#;

pub fn execute(args: &InitArgs) -> Result<(), RelayError> {
    let path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("cors-relay.{}", args.format.extension())));

    if path.exists() {
        return Err(RelayError::FileExists { path });
    }

    std::fs::write(&path, template(&args.format)?)?;

    println!("Created {}", path.display());
    println!("Start the proxy with: cors-relay run -c {}", path.display());
    Ok(())
}

fn template(format: &ConfigFormat) -> Result<&'static str, RelayError> {
    match format {
        ConfigFormat::Yaml => {
            #[cfg(feature = "yaml")]
            {
                Ok(YAML_TEMPLATE)
            }
            #[cfg(not(feature = "yaml"))]
            {
                Err(RelayError::UnsupportedFormat("yaml".into()))
            }
        }
        ConfigFormat::Json => {
            #[cfg(feature = "json")]
            {
                Ok(JSON_TEMPLATE)
            }
            #[cfg(not(feature = "json"))]
            {
                Err(RelayError::UnsupportedFormat("json".into()))
            }
        }
        ConfigFormat::Toml => {
            #[cfg(feature = "toml")]
            {
                Ok(TOML_TEMPLATE)
            }
            #[cfg(not(feature = "toml"))]
            {
                Err(RelayError::UnsupportedFormat("toml".into()))
            }
        }
    }
}
