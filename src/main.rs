use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use jobtrack::analysis::{Dashboard, DeadlineBucket, FilterCriteria};
use jobtrack::client::ApiClient;
use jobtrack::config::{ServerConfig, TracingConfig, DEFAULT_API_URL};
use jobtrack::logging::init_tracing;
use jobtrack::models::{ApplicationRecord, ApplicationStatus, Deadline, NewApplication};
use jobtrack::store::ApplicationStore;
use jobtrack::text::truncate;
use jobtrack::{server, tui};

#[derive(Parser)]
#[command(name = "jobtrack")]
#[command(about = "Job application tracker - serve, track, and summarize applications")]
struct Cli {
    /// Applications endpoint of a running server
    #[arg(long, global = true, env = "JOBTRACK_URL", default_value = DEFAULT_API_URL)]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP backend
    Serve {
        /// Listen host (defaults to $HOST or 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (defaults to $PORT or 5000)
        #[arg(short, long)]
        port: Option<u16>,

        /// JSON file with an array of records to start from
        #[arg(long, conflicts_with = "empty")]
        seed: Option<PathBuf>,

        /// Start with no records instead of the sample data
        #[arg(long)]
        empty: bool,
    },

    /// List applications, sorted by deadline
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Add an application
    Add {
        /// Company name
        company: String,

        /// Role title
        role: String,

        /// Deadline (YYYY-MM-DD)
        #[arg(short, long)]
        deadline: String,

        /// Status (Researching, Interested, Applied, Interviewed, Offered,
        /// Rejected, Pending Response, Other)
        #[arg(short, long)]
        status: String,
    },

    /// Change the status of an application
    Status {
        /// Application ID
        id: String,

        /// New status
        status: String,
    },

    /// Delete an application
    Delete {
        /// Application ID
        id: String,
    },

    /// Show status distribution, deadlines, pending and follow-ups
    Report {
        /// Print the full dashboard as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive dashboard
    Browse {
        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// Company contains (case-insensitive)
    #[arg(short, long)]
    company: Option<String>,

    /// Role contains (case-insensitive)
    #[arg(short, long)]
    role: Option<String>,

    /// Exact status
    #[arg(short, long)]
    status: Option<String>,
}

impl From<FilterArgs> for FilterCriteria {
    fn from(args: FilterArgs) -> Self {
        FilterCriteria {
            company: args.company,
            role: args.role,
            status: args.status,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            seed,
            empty,
        } => {
            init_tracing(&TracingConfig::for_server());

            let mut config = ServerConfig::default();
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }

            let store = match (seed, empty) {
                (Some(path), _) => ApplicationStore::from_seed_file(&path)?,
                (None, true) => ApplicationStore::empty(),
                (None, false) => ApplicationStore::with_sample_data(),
            };

            let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
            runtime.block_on(server::serve(&config, store))?;
        }

        Commands::List { filter } => {
            init_tracing(&TracingConfig::default());
            let client = ApiClient::new(&cli.url)?;
            let records = client.fetch_applications();
            let dashboard = Dashboard::build(&records, &filter.into(), today());

            if dashboard.rows.is_empty() {
                println!("No applications found.");
            } else {
                println!(
                    "{:<2} {:<14} {:<11} {:<20} {:<26} {:<16}",
                    "", "ID", "DEADLINE", "COMPANY", "ROLE", "STATUS"
                );
                println!("{}", "-".repeat(94));
                for row in &dashboard.rows {
                    let record = &row.record;
                    println!(
                        "{:<2} {:<14} {:<11} {:<20} {:<26} {:<16}",
                        bucket_marker(row.bucket),
                        record.id,
                        truncate(record.deadline.as_str(), 11),
                        truncate(&record.company, 18),
                        truncate(&record.role, 24),
                        record.status.as_str()
                    );
                }
                println!("\n!! overdue   ! due today   ~ due within 7 days");
            }
        }

        Commands::Add {
            company,
            role,
            deadline,
            status,
        } => {
            init_tracing(&TracingConfig::default());
            if [&company, &role, &deadline, &status].iter().any(|f| f.trim().is_empty()) {
                tracing::warn!("Please fill in all fields (Company, Role, Deadline, and Status).");
                println!("Nothing added: company, role, deadline and status are all required.");
                return Ok(());
            }

            let client = ApiClient::new(&cli.url)?;
            let app = NewApplication {
                company,
                role,
                deadline: Deadline::new(deadline),
                status: ApplicationStatus::parse(&status),
            };
            let record = client.create(&app).context("Error adding application")?;
            println!("Added application #{} ({} - {})", record.id, record.company, record.role);
            print_total(&client);
        }

        Commands::Status { id, status } => {
            init_tracing(&TracingConfig::default());
            let client = ApiClient::new(&cli.url)?;
            let record = client
                .update_status(&id, &ApplicationStatus::parse(&status))
                .context("Error updating application status")?;
            println!("#{} {} - {} is now {}", record.id, record.company, record.role, record.status);
            print_total(&client);
        }

        Commands::Delete { id } => {
            init_tracing(&TracingConfig::default());
            let client = ApiClient::new(&cli.url)?;
            let message = client.delete(&id).context("Error deleting application")?;
            println!("{}", message);
            print_total(&client);
        }

        Commands::Report { json } => {
            init_tracing(&TracingConfig::default());
            let client = ApiClient::new(&cli.url)?;
            let records = client.fetch_applications();
            let dashboard = Dashboard::build(&records, &FilterCriteria::default(), today());

            if json {
                println!("{}", serde_json::to_string_pretty(&dashboard)?);
            } else {
                print_report(&dashboard);
            }
        }

        Commands::Browse { filter } => {
            init_tracing(&TracingConfig::for_terminal_ui());
            let client = ApiClient::new(&cli.url)?;
            tui::run_browse(&client, filter.into())?;
        }
    }

    Ok(())
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

// Mutations are followed by a full re-fetch rather than patching local state.
fn print_total(client: &ApiClient) {
    let records = client.fetch_applications();
    println!("{} application(s) tracked.", records.len());
}

fn print_report(dashboard: &Dashboard) {
    println!("Total applications: {}", dashboard.total);
    println!("\nStatus distribution:");
    for entry in &dashboard.status_counts {
        let filled = ((entry.percentage / 100.0) * 30.0).round() as usize;
        println!(
            "  {:<17} {:<30} {:>3} ({:.1}%)",
            format!("{}:", entry.status),
            "#".repeat(filled),
            entry.count,
            entry.percentage
        );
    }

    print_section("Upcoming deadlines (next 7 days)", &dashboard.upcoming, "No upcoming deadlines.", false);
    print_section("Past deadlines", &dashboard.past, "No past deadlines.", true);
    print_section("Pending applications", &dashboard.pending, "No pending applications.", true);
    print_section("Follow-up reminders", &dashboard.follow_up, "No follow-ups needed.", true);
}

fn print_section(title: &str, records: &[ApplicationRecord], empty: &str, with_status: bool) {
    println!("\n{}:", title);
    if records.is_empty() {
        println!("  {}", empty);
        return;
    }
    for record in records {
        if with_status {
            println!(
                "  {} - {} (Deadline: {}, Status: {})",
                record.company, record.role, record.deadline, record.status
            );
        } else {
            println!("  {} - {} (Deadline: {})", record.company, record.role, record.deadline);
        }
    }
}

fn bucket_marker(bucket: DeadlineBucket) -> &'static str {
    match bucket {
        DeadlineBucket::Overdue => "!!",
        DeadlineBucket::DueToday => "!",
        DeadlineBucket::DueWithinWeek => "~",
        DeadlineBucket::None => "",
    }
}

