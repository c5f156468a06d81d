use clap::{Arg, ArgAction, ArgMatches, ColorChoice, Command};

pub struct Cli {
    /// Arguments passed by user
    matches: ArgMatches,
}

impl Cli {
    /// Build new command line interface
    pub fn new() -> Self {
        Self {
            matches: {
                Command::new("gnss2influx")
                    .author("gnss2influx contributors")
                    .version(env!("CARGO_PKG_VERSION"))
                    .about("GNSS receiver listener supervisor and InfluxDB collecter")
                    .color(ColorChoice::Always)
                    .next_help_heading("Configuration")
                    .arg(
                        Arg::new("config")
                            .short('c')
                            .long("config")
                            .value_name("FILE")
                            .default_value("./config/config.yaml")
                            .help("Yaml file describing the listener fleet and the InfluxDB credential file to use."),
                    )
                    .next_help_heading("Supervision")
                    .arg(
                        Arg::new("max-retries")
                            .long("max-retries")
                            .value_name("N")
                            .default_value("5")
                            .help("Restart attempts per listener before it is permanently abandoned."),
                    )
                    .arg(
                        Arg::new("dry-run")
                            .long("dry-run")
                            .action(ArgAction::SetTrue)
                            .help("Decode and log position records without writing anything to InfluxDB."),
                    )
                    .get_matches()
            },
        }
    }

    /// Returns configuration file path
    pub fn config_path(&self) -> &str {
        self.matches
            .get_one::<String>("config")
            .map(|s| s.as_str())
            .unwrap_or("./config/config.yaml")
    }

    /// Returns max restart attempts per listener
    pub fn max_retries(&self) -> u32 {
        let raw = self
            .matches
            .get_one::<String>("max-retries")
            .map(|s| s.as_str())
            .unwrap_or("5");

        raw.trim()
            .parse::<u32>()
            .unwrap_or_else(|e| panic!("Invalid --max-retries value \"{}\": {}", raw, e))
    }

    /// True if records should be logged instead of written
    pub fn dry_run(&self) -> bool {
        self.matches.get_flag("dry-run")
    }
}
