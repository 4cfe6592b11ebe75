mod logging;
mod run;
mod settings;

use settings::Settings;
use std::process::ExitCode;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    logging::setup_logging();
    let settings = Settings::from_cli();

    match run::run(&settings).await {
        Ok(outcome) => {
            println!("{}", outcome.status_message());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Export failed: {e}");
            eprintln!("Export failed: {e}");
            ExitCode::FAILURE
        }
    }
}
