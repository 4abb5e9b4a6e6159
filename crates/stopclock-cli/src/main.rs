use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "stopclock", version, about = "Persistent minutes:seconds stopwatch")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the stopwatch
    Start,
    /// Stop the stopwatch
    Stop,
    /// Reset the stopwatch to zero
    Clear,
    /// Print the current state as JSON
    Status,
    /// Live readout in the terminal
    Watch {
        /// Print one formatted line and exit
        #[arg(long)]
        once: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Start => commands::timer::start(),
        Commands::Stop => commands::timer::stop(),
        Commands::Clear => commands::timer::clear(),
        Commands::Status => commands::timer::status(),
        Commands::Watch { once } => commands::watch::run(once),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
