use clap::ArgAction;
use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use kursverwaltung_dashboard::cli::manage_records;
use kursverwaltung_dashboard::cli_error::CliError;
use kursverwaltung_dashboard::dashboard::Tab;
use log::{error, warn};

fn main() {
    let args = CliArgs::parse();
    let dotenv_result = dotenv();

    let env = env_logger::Env::new().filter_or(
        "RUST_LOG",
        match args.global_opts.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        },
    );
    env_logger::Builder::from_env(env).init();
    if let Err(e) = dotenv_result {
        warn!("Could not read .env file: {}", e);
    }

    if let Err(e) = run(args.command) {
        error!("{}", e);
        eprintln!("{}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(command: Command) -> Result<(), CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        match command {
            Command::Overview => manage_records::print_overview().await,
            Command::List { tab } => manage_records::print_record_list(tab).await,
            Command::Add { tab } => manage_records::add_record(tab).await,
            Command::Edit { tab, record_id } => manage_records::edit_record(tab, &record_id).await,
            Command::Delete { tab, record_id } => {
                manage_records::delete_record(tab, &record_id).await
            }
            Command::TogglePaid { record_id } => manage_records::toggle_payment(&record_id).await,
        }
    })
}

/// Kursverwaltung: manage courses, lecturers, participants, rooms and enrollments
#[derive(Debug, Parser)]
#[clap(name = "kursverwaltung", version)]
pub struct CliArgs {
    #[clap(flatten)]
    global_opts: GlobalOpts,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the statistics and the list of courses
    Overview,
    /// List all records of one kind
    List {
        #[clap(value_enum)]
        tab: Tab,
    },
    /// Interactively create a new record
    Add {
        #[clap(value_enum)]
        tab: Tab,
    },
    /// Interactively edit an existing record
    Edit {
        #[clap(value_enum)]
        tab: Tab,
        record_id: String,
    },
    /// Delete a record (after confirmation)
    Delete {
        #[clap(value_enum)]
        tab: Tab,
        record_id: String,
    },
    /// Flip the payment status of an enrollment
    TogglePaid { record_id: String },
}

#[derive(Debug, Args)]
struct GlobalOpts {
    /// Verbosity level (can be specified multiple times)
    #[clap(long, short, global = true, action = ArgAction::Count)]
    verbose: u8,
}
