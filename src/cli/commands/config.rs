use crate::cli::ConfigCommand;
use nhncloud_rds::config::Config;

pub fn execute(command: ConfigCommand) -> anyhow::Result<()> {
    match command {
        ConfigCommand::Init => {
            let path = Config::create_sample()?;
            println!("Created sample config at: {}", path.display());
            println!("Fill in app_key, access_key and secret_key before use.");
        }
        ConfigCommand::Path => {
            let config_path = Config::config_file_path()?;
            println!("Config file path: {}", config_path.display());

            if config_path.exists() {
                println!("Status: File exists");
            } else {
                println!("Status: File does not exist (environment only)");
            }

            match Config::load() {
                Ok(config) => match config.client_config() {
                    Ok(client) => {
                        println!("Complete: Yes");
                        println!("  Region: {}", client.region);
                        println!("  Credentials: {:?}", client.credentials);
                    }
                    Err(e) => println!("Complete: No ({})", e),
                },
                Err(e) => {
                    println!("Valid: No");
                    println!("Error: {}", e);
                }
            }

            if !config_path.exists() {
                println!("\nTo create a sample config file, run:");
                println!("  nhncloud-rds config init");
            }
        }
    }

    Ok(())
}
