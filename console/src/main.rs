mod commands;
mod config;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use entity::{ContactPreference, EmployeeId};
use platform_obs::{ObsConfig, init_tracing};

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "employee-console", version, about = "Employee records console")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every employee.
    List,
    /// Show one employee.
    Show { id: EmployeeId },
    /// Create an employee from field flags.
    Create(EmployeeArgs),
    /// Update an employee; omitted flags keep the stored values.
    Update {
        id: EmployeeId,
        #[command(flatten)]
        fields: EmployeeArgs,
    },
    /// Delete an employee and print the refreshed list.
    Delete { id: EmployeeId },
    /// Open a client route such as /list or /employee-details/3.
    Open { route: String },
}

#[derive(Args, Debug, Default)]
struct EmployeeArgs {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long, value_name = "email|phone")]
    contact_preference: Option<ContactPreference>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    skill_name: Option<String>,
    #[arg(long, value_name = "YEARS")]
    experience: Option<String>,
    #[arg(long)]
    proficiency: Option<String>,
    #[arg(long, help = "Refuse to submit when any field is invalid")]
    strict: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let _obs = init_tracing(ObsConfig::default())?;
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    commands::run(cli.command, &config).await
}
