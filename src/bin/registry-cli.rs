use clap::{Parser, Subcommand};
use user_registry::{
    client::{CreateUserScreen, HttpUserApi, Notification, Severity, ViewUsersScreen},
    telemetry,
    users::dto::{CreateUserRequest, UserResponse},
};

/// Terminal frontend for the user registry API.
#[derive(Debug, Parser)]
#[command(name = "registry-cli", version, about)]
struct Cli {
    /// API root, e.g. http://localhost:8080/api
    #[arg(long, env = "API_URL", default_value = "http://localhost:8080/api")]
    api_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a user
    Create {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone_number: String,
        #[arg(long)]
        password: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date_of_birth: String,
    },
    /// List users, optionally filtered by date of birth
    List {
        #[arg(long, default_value = "")]
        from_date: String,
        #[arg(long, default_value = "")]
        to_date: String,
    },
}

fn print_notifications(notifications: &[Notification]) -> bool {
    let mut failed = false;
    for n in notifications {
        match n.severity {
            Severity::Success => println!("{}: {}", n.summary, n.detail),
            Severity::Error => {
                failed = true;
                eprintln!("{}: {}", n.summary, n.detail);
            }
        }
    }
    failed
}

fn print_table(users: &[UserResponse]) {
    println!(
        "{:<20} {:<20} {:<32} {:<16} {:<12}",
        "First name", "Last name", "Email", "Phone", "Born"
    );
    for u in users {
        println!(
            "{:<20} {:<20} {:<32} {:<16} {:<12}",
            u.first_name, u.last_name, u.email, u.phone_number, u.date_of_birth
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init("registry_cli=info,user_registry=warn");

    let cli = Cli::parse();
    let api = HttpUserApi::new(cli.api_url);

    let failed = match cli.command {
        Command::Create {
            first_name,
            last_name,
            email,
            phone_number,
            password,
            date_of_birth,
        } => {
            let mut screen = CreateUserScreen::new();
            screen.form = CreateUserRequest {
                first_name,
                last_name,
                email,
                phone_number,
                password,
                date_of_birth,
            };
            let created = screen.submit(&api).await;
            let mut failed = created.is_none();
            for err in [&screen.errors.email, &screen.errors.password]
                .into_iter()
                .flatten()
            {
                eprintln!("{err}");
            }
            failed |= print_notifications(&screen.notifications);
            failed
        }
        Command::List { from_date, to_date } => {
            let mut screen = ViewUsersScreen::new();
            screen.date_from = from_date;
            screen.date_to = to_date;
            screen.filter(&api).await;
            let failed = print_notifications(&screen.notifications);
            if !failed {
                print_table(&screen.users);
            }
            failed
        }
    };

    if failed {
        std::process::exit(1);
    }
    Ok(())
}
