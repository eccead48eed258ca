use clap::Parser;
use color_eyre::Result;
use cube_report::app::App;
use cube_report::cli::CliArgs;
use cube_report::config::init_app_config;
use cube_report::cube::CubeClient;
use cube_report::{event, logging, terminal};
use cube_report_core::MemoryHistory;

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    let args = CliArgs::parse();
    args.apply_env_overrides();
    let config = init_app_config()?;

    let history = args
        .query
        .as_deref()
        .map_or_else(MemoryHistory::new, |query| MemoryHistory::with_initial(query));
    let mut app = App::new(config.endpoint()?, history, config.column_layout());
    let client = CubeClient::new()?;

    // Check if we're running in a terminal
    if args.headless || args.json || !is_terminal() {
        logging::init_stderr_logging(&config)?;
        return event::run_headless(&mut app, &client, args.json).await;
    }

    // The dashboard owns stdout, so logs go to a file
    let _log_guard = logging::init_file_logging(&config)?;
    tracing::info!(base_url = %config.base_url, "starting dashboard");

    let mut terminal = terminal::setup()?;
    let result = event::run(&mut terminal, &mut app, client).await;
    terminal::cleanup(true, true);

    result
}

// Check if we're running in a terminal
fn is_terminal() -> bool {
    atty::is(atty::Stream::Stdout)
}
