use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand, ValueEnum};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{AppDefaults, Engine, Role};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

type CliResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "mercato_admin")]
#[command(about = "Admin utilities for Mercato (bootstrap users, vendors and defaults)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./mercato.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Vendor(Vendor),
    Defaults(Defaults),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RoleArg {
    Admin,
    Vendor,
}

impl From<RoleArg> for Role {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Admin => Role::Admin,
            RoleArg::Vendor => Role::Vendor,
        }
    }
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long, value_enum)]
    role: RoleArg,
    /// Required for vendor logins.
    #[arg(long)]
    vendor_id: Option<Uuid>,
}

#[derive(Args, Debug)]
struct Vendor {
    #[command(subcommand)]
    command: VendorCommand,
}

#[derive(Subcommand, Debug)]
enum VendorCommand {
    Create(VendorCreateArgs),
}

#[derive(Args, Debug)]
struct VendorCreateArgs {
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct Defaults {
    #[command(subcommand)]
    command: DefaultsCommand,
}

#[derive(Subcommand, Debug)]
enum DefaultsCommand {
    Show,
    Set(DefaultsSetArgs),
}

#[derive(Args, Debug)]
struct DefaultsSetArgs {
    #[arg(long)]
    max_debt_minor: i64,
    #[arg(long)]
    service_charge_bps: i64,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> CliResult<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn notice(message: &str) -> CliResult<()> {
    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(message),
        Print("\r\n")
    )?;
    Ok(())
}

/// Read a line without echoing it; every key shows up as `*`.
fn prompt_password(prompt: &str) -> CliResult<String> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                break;
            }
            KeyCode::Backspace if buf.pop().is_some() => {
                execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
            }
            _ => {}
        }
        out.flush()?;
    }

    Ok(buf)
}

fn prompt_password_twice() -> CliResult<String> {
    for _ in 0..3 {
        let first = prompt_password("Password: ")?;
        if first.is_empty() {
            notice("Password must not be empty.")?;
            continue;
        }

        let second = prompt_password("Confirm password: ")?;
        if first == second {
            return Ok(first);
        }
        notice("Passwords do not match. Try again.")?;
    }

    Err("too many attempts".into())
}

async fn connect_db(database_url: &str) -> CliResult<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn print_defaults(defaults: &AppDefaults) {
    println!("max_debt_minor: {}", defaults.max_debt_minor);
    println!("service_charge_bps: {}", defaults.service_charge_bps);
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;
            let user = engine
                .new_user(&args.username, &password, args.role.into(), args.vendor_id)
                .await?;
            println!("created {} user: {}", user.role.as_str(), user.username);
        }
        Command::Vendor(Vendor {
            command: VendorCommand::Create(args),
        }) => {
            let vendor_id = engine.new_vendor(&args.name).await?;
            println!("created vendor: {} ({vendor_id})", args.name);
        }
        Command::Defaults(Defaults {
            command: DefaultsCommand::Show,
        }) => {
            print_defaults(&engine.app_defaults().await?);
        }
        Command::Defaults(Defaults {
            command: DefaultsCommand::Set(args),
        }) => {
            let wanted = AppDefaults {
                max_debt_minor: args.max_debt_minor,
                service_charge_bps: args.service_charge_bps,
            };
            // Seeds the row on a fresh database, then overwrites it.
            engine.ensure_app_defaults(wanted).await?;
            let stored = engine.update_app_defaults(wanted).await?;
            print_defaults(&stored);
        }
    }

    Ok(())
}
