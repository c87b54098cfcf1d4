use crate::demo::{run_availability, run_demo, AvailabilityArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use holiday_booking::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Holiday Light Booking",
    about = "Run the holiday light installation booking service or try it from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the season calendar and the number of open installation slots
    Availability(AvailabilityArgs),
    /// Walk a scripted booking through all five steps
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Availability(args) => run_availability(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}
