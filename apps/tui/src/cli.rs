use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "cube-report", version, about = "Homicide statistics dashboard")]
pub struct CliArgs {
    /// Print the report and exit
    #[arg(long)]
    pub headless: bool,

    /// Print the headless report as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Override the cube base URL
    #[arg(long = "base-url", value_name = "URL")]
    pub base_url: Option<String>,

    /// Start from a shared dashboard query, e.g. 'group=sex&weapon=knife'
    #[arg(long, value_name = "QUERY")]
    pub query: Option<String>,

    /// Override the log file location
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<String>,
}

impl CliArgs {
    pub fn apply_env_overrides(&self) {
        if let Some(url) = &self.base_url {
            std::env::set_var("CUBE_BASE_URL", url);
        }
        if let Some(path) = &self.log_file {
            std::env::set_var("REPORT_LOG_FILE", path);
        }
        if self.debug {
            std::env::set_var("REPORT_LOG", "debug");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_query_and_flags() {
        let args = CliArgs::parse_from([
            "cube-report",
            "--headless",
            "--json",
            "--query",
            "group=sex&weapon=knife",
        ]);
        assert!(args.headless);
        assert!(args.json);
        assert_eq!(args.query.as_deref(), Some("group=sex&weapon=knife"));
        assert_eq!(args.base_url, None);
    }

    #[test]
    fn debug_flag_is_off_by_default() {
        let args = CliArgs::parse_from(["cube-report", "--debug"]);
        assert!(args.debug);
        assert!(!CliArgs::parse_from(["cube-report"]).debug);
    }
}
