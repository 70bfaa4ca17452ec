use crate::app_config::AppConfig;
use crate::cli::Cli;
use crate::gateway::Session;
use clap::Parser;
use std::error::Error;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};

mod app_config;
mod cli;
mod display;
mod domain;
mod extensions;
mod gateway;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt().with_max_level(cli.log_level()).with_writer(std::io::stderr).init();

    info!("🪵 Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    match run(&cli).await {
        Ok(output) => {
            println!("{}", output.trim_end_matches('\n'));
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("❌ {}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<String, Box<dyn Error>> {
    let config = AppConfig::load()?;
    info!("✅ Loaded configuration");

    let settings = Settings::resolve(cli, &config);
    let session = Session::open(&cli.address, settings.port, settings.timeout).await?;
    let params = cli.params();

    if cli.raw {
        return Ok(session.call_raw(cli.command, &params).await?);
    }

    if cli.demand {
        let reading = session.instantaneous_demand().await?;
        return Ok(display::render_demand(&reading));
    }

    let response = session.call(cli.command, &params).await?;
    if cli.json {
        Ok(serde_json::to_string_pretty(&response)?)
    } else {
        Ok(display::render(&response, &settings.delimiter))
    }
}

/// Connection and output settings, with command-line flags taking precedence.
#[derive(Debug, PartialEq)]
struct Settings {
    port: u16,
    timeout: Duration,
    delimiter: String,
}

impl Settings {
    fn resolve(cli: &Cli, config: &AppConfig) -> Self {
        Settings {
            port: cli.port.unwrap_or(config.gateway().port()),
            timeout: cli.timeout.map(Duration::from_secs).unwrap_or(config.gateway().timeout()),
            delimiter: cli.delimiter.clone().unwrap_or_else(|| config.output().delimiter().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::AppConfigBuilder;
    use pretty_assertions::assert_eq;

    #[test]
    fn settings_come_from_the_configuration_by_default() {
        let cli = Cli::try_parse_from(["meter-reader", "eagle.local"]).unwrap();
        let config = AppConfigBuilder::new().port(5003).timeout(Duration::from_secs(3)).delimiter("\t").build();

        let settings = Settings::resolve(&cli, &config);

        assert_eq!(
            settings,
            Settings {
                port: 5003,
                timeout: Duration::from_secs(3),
                delimiter: "\t".to_string(),
            }
        );
    }

    #[test]
    fn flags_override_the_configuration() {
        let cli = Cli::try_parse_from(["meter-reader", "eagle.local", "-p", "6000", "--timeout", "30", "--delimiter", "|"]).unwrap();
        let config = AppConfigBuilder::new().build();

        let settings = Settings::resolve(&cli, &config);

        assert_eq!(
            settings,
            Settings {
                port: 6000,
                timeout: Duration::from_secs(30),
                delimiter: "|".to_string(),
            }
        );
    }
}
