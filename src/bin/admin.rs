use ak_in_web::config::ServerConfig;
use ak_in_web::models::short_id;
use ak_in_web::user_models::User;
use ak_in_web::user_storage::UserStorage;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use prettytable::{Cell, Row, Table};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "admin")]
#[command(about = "Manage AK_In_Web accounts (reads DATA_DIR like the server)", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Create a new account")]
    Create {
        #[arg(short, long, help = "Username")]
        username: String,

        #[arg(short, long, help = "Password")]
        password: String,

        #[arg(long, help = "Create a regular account without admin rights")]
        no_admin: bool,
    },

    #[command(about = "Replace the password of an existing account")]
    ResetPassword {
        #[arg(short, long, help = "Username")]
        username: String,

        #[arg(short, long, help = "New password")]
        password: String,
    },

    #[command(about = "Check a username/password pair against the stored hash")]
    Verify {
        #[arg(short, long, help = "Username")]
        username: String,

        #[arg(short, long, help = "Password")]
        password: String,
    },

    #[command(about = "List accounts")]
    List,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run_command(cli.command).await {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_command(command: Commands) -> Result<()> {
    let config = ServerConfig::from_env();
    std::fs::create_dir_all(&config.data_dir)
        .context("Failed to create data directory")?;
    let storage = UserStorage::new(&config.data_dir, config.token_ttl())?;

    match command {
        Commands::Create { username, password, no_admin } => {
            create(&storage, username, password, !no_admin).await?;
        }
        Commands::ResetPassword { username, password } => {
            reset_password(&storage, username, password).await?;
        }
        Commands::Verify { username, password } => {
            verify(&storage, username, password).await?;
        }
        Commands::List => {
            list(&storage).await;
        }
    }

    Ok(())
}

fn hash_password(password: &str) -> Result<String> {
    if password.len() < 6 {
        bail!("Password must be at least 6 characters long");
    }
    bcrypt::hash(password, bcrypt::DEFAULT_COST).context("Failed to hash password")
}

async fn create(storage: &UserStorage, username: String, password: String, is_admin: bool) -> Result<()> {
    if username.trim().is_empty() {
        bail!("Username cannot be empty");
    }

    let password_hash = hash_password(&password)?;
    let user = storage
        .create_user(User::new(username.clone(), password_hash, is_admin))
        .await?;

    println!("✅ Account created successfully!");
    println!("👤 Username: {}", username);
    println!("🆔 User ID: {}", user.id);
    println!("🔑 Admin: {}", if user.is_admin { "yes" } else { "no" });
    println!("\n💡 Log in from the client with: akweb login -u {} -p <password>", username);

    Ok(())
}

async fn reset_password(storage: &UserStorage, username: String, password: String) -> Result<()> {
    let password_hash = hash_password(&password)?;
    storage.set_password_hash(&username, password_hash).await?;

    println!("✅ Password updated for '{}'", username);
    println!("💡 Restart the server to drop sessions issued with the old password");

    Ok(())
}

async fn verify(storage: &UserStorage, username: String, password: String) -> Result<()> {
    match storage.verify_credentials(&username, &password).await? {
        Some(user) => {
            println!("✅ Password matches for '{}'", user.username);
            Ok(())
        }
        None => bail!("Invalid username or password"),
    }
}

async fn list(storage: &UserStorage) {
    let users = storage.list_users().await;

    if users.is_empty() {
        println!("📭 No accounts yet.");
        println!("💡 Use 'admin create -u <username> -p <password>' to add one");
        return;
    }

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("ID"),
        Cell::new("Username"),
        Cell::new("Admin"),
        Cell::new("Created"),
    ]));

    for user in users {
        table.add_row(Row::new(vec![
            Cell::new(short_id(&user.id)),
            Cell::new(&user.username),
            Cell::new(if user.is_admin { "yes" } else { "no" }),
            Cell::new(&user.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
        ]));
    }

    table.printstd();
}
