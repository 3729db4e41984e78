use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result, miette};
use railbook::application::booking::{BookingService, CheckoutPolicy};
use railbook::application::reconcile::Reconciler;
use railbook::application::tickets::TicketDesk;
use railbook::config::{Settings, load_settings};
use railbook::domain::booking::{BookingRequest, Passenger};
use railbook::domain::money::SeatCount;
use railbook::domain::ports::{PendingPaymentStoreBox, SessionStore, SharedSession};
use railbook::domain::session::AuthState;
use railbook::domain::signature;
use railbook::error::BookingError;
use railbook::infrastructure::http::HttpBackend;
use railbook::infrastructure::in_memory::InMemoryPendingStore;
#[cfg(feature = "storage-rocksdb")]
use railbook::infrastructure::rocksdb::RocksDBStore;
use railbook::infrastructure::session::TokenFileSession;
use railbook::interfaces::console::checkout_prompt::CheckoutPrompt;
use railbook::interfaces::csv::ticket_writer::TicketWriter;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML config file. Defaults to ./railbook.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the API gateway base URL.
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the fare for a number of seats
    Quote {
        #[arg(long)]
        seats: u32,
    },
    /// Show login state and whether booking is enabled
    Status,
    /// Pay for and book a ticket
    Book(BookArgs),
    /// List booked tickets
    Tickets {
        /// Write CSV to stdout
        #[arg(long)]
        csv: bool,
        /// Hide cancelled tickets
        #[arg(long)]
        active: bool,
    },
    /// Cancel a ticket and request a refund
    Cancel { ticket_id: u64 },
    /// Save tickets for verified payments that were never persisted
    Reconcile {
        /// Path to persistent database (optional). If provided, uses RocksDB.
        #[arg(long)]
        db_path: Option<PathBuf>,
    },
    /// Check a gateway signature against the merchant secret
    VerifySignature {
        #[arg(long)]
        order_id: String,
        #[arg(long)]
        payment_id: String,
        #[arg(long)]
        signature: String,
        #[arg(long)]
        secret: String,
    },
}

#[derive(Args)]
struct BookArgs {
    #[arg(long)]
    train_id: u64,
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    age: u8,
    /// Travel date, YYYY-MM-DD
    #[arg(long)]
    date: NaiveDate,
    #[arg(long)]
    seats: u32,
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref()).into_diagnostic()?;
    if let Some(api_url) = cli.api_url {
        settings.api_base_url = api_url;
    }
    let session: SharedSession = Arc::new(TokenFileSession::new(settings.token_file.clone()));

    match cli.command {
        Command::Quote { seats } => {
            let fare = settings.fare().into_diagnostic()?;
            let seats = SeatCount::new(seats).into_diagnostic()?;
            println!("Total Amount: {}", fare.total(seats).into_diagnostic()?);
            println!(
                "Gateway amount: {} ({} minor units)",
                fare.gateway_amount(seats).into_diagnostic()?,
                settings.currency
            );
        }
        Command::Status => {
            let token = session.token().into_diagnostic()?;
            let state = AuthState::inspect(token.as_deref(), Utc::now());
            match &state {
                AuthState::Authenticated {
                    email, expires_at, ..
                } => println!(
                    "Logged in as {} until {}",
                    email.as_deref().unwrap_or("unknown user"),
                    expires_at.to_rfc3339()
                ),
                AuthState::Expired => println!("Session expired"),
                AuthState::Anonymous => println!("Not logged in"),
            }
            let gate = if state.booking_enabled() { "enabled" } else { "disabled" };
            println!("Booking: {gate}");
        }
        Command::Book(args) => book(&settings, session, args).await?,
        Command::Tickets { csv, active } => {
            let desk = TicketDesk::new(Box::new(http_backend(&settings, session)?));
            let tickets = if active {
                desk.active().await
            } else {
                desk.list().await
            }
            .into_diagnostic()?;

            if csv {
                let stdout = io::stdout();
                TicketWriter::new(stdout.lock())
                    .write_tickets(&tickets)
                    .into_diagnostic()?;
            } else if tickets.is_empty() {
                println!("No tickets booked");
            } else {
                for t in &tickets {
                    println!(
                        "#{} {} {} -> {} on {} ({} seats) {}",
                        t.ticket_id.map(|id| id.to_string()).unwrap_or_default(),
                        t.train_name.as_deref().unwrap_or("-"),
                        t.source.as_deref().unwrap_or("-"),
                        t.destination.as_deref().unwrap_or("-"),
                        t.booking_date.map(|d| d.to_string()).unwrap_or_default(),
                        t.no_of_seats.unwrap_or_default(),
                        t.status
                    );
                }
            }
        }
        Command::Cancel { ticket_id } => {
            let desk = TicketDesk::new(Box::new(http_backend(&settings, session)?));
            let receipt = desk.cancel(ticket_id).await.into_diagnostic()?;
            println!("{}", receipt.message);
            if receipt.refund_processed {
                println!(
                    "Refund {}: {} of {} (fee {}), {}",
                    receipt.refund_id.as_deref().unwrap_or("-"),
                    receipt.refund_amount,
                    receipt.original_amount,
                    receipt.cancellation_fee,
                    receipt.expected_refund_time.as_deref().unwrap_or("timing unknown")
                );
            }
        }
        Command::Reconcile { db_path } => {
            let reconciler = Reconciler::new(
                Box::new(http_backend(&settings, session.clone())?),
                pending_store(db_path)?.store,
                session,
            );
            let report = reconciler.run().await.into_diagnostic()?;
            println!(
                "{} settled, {} still pending",
                report.settled.len(),
                report.still_pending.len()
            );
            for order_id in &report.still_pending {
                println!("pending: {order_id}");
            }
        }
        Command::VerifySignature {
            order_id,
            payment_id,
            signature: sig,
            secret,
        } => {
            if signature::verify(&order_id, &payment_id, &sig, &secret).into_diagnostic()? {
                println!("Signature valid");
            } else {
                return Err(miette!("Signature does not match order {order_id}"));
            }
        }
    }

    Ok(())
}

async fn book(settings: &Settings, session: SharedSession, args: BookArgs) -> Result<()> {
    let request = BookingRequest::new(
        args.train_id,
        Passenger {
            full_name: args.name,
            email: args.email,
            age: args.age,
        },
        args.date,
        SeatCount::new(args.seats).into_diagnostic()?,
    )
    .into_diagnostic()?;

    let policy = CheckoutPolicy {
        fare: settings.fare().into_diagnostic()?,
        branding: settings.branding().into_diagnostic()?,
        checkout_timeout: settings.checkout_timeout(),
    };
    let backend = http_backend(settings, session.clone())?;
    let checkout = CheckoutPrompt::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout());
    let pending = pending_store(args.db_path)?;
    let durable = pending.durable;

    let service = BookingService::new(
        Box::new(backend.clone()),
        Box::new(backend),
        Box::new(checkout),
        pending.store,
        session,
        policy,
    );

    match service.book(request).await {
        Ok(outcome) => {
            println!("Ticket booked successfully!");
            println!(
                "{}",
                serde_json::to_string_pretty(&outcome.ticket).into_diagnostic()?
            );
            Ok(())
        }
        Err(e) => {
            match &e {
                BookingError::BookingNotPersisted { .. } if durable => {
                    warn!("payment saved as pending; run `railbook reconcile` with this --db-path");
                }
                BookingError::BookingNotPersisted {
                    order_id,
                    payment_id,
                    attempt,
                    ..
                }
                | BookingError::PaymentUnrecorded {
                    order_id,
                    payment_id,
                    attempt,
                    ..
                } => {
                    // Nothing durable holds this payment; the ids are all that is left.
                    println!("Payment verified but no ticket was saved.");
                    println!("  order:   {order_id}");
                    println!("  payment: {payment_id}");
                    println!("  attempt: {attempt}");
                }
                _ if e.is_retryable() => {
                    warn!(error = %e, "booking failed with a retryable error; try again");
                }
                _ => {}
            }
            Err(e).into_diagnostic()
        }
    }
}

fn http_backend(settings: &Settings, session: SharedSession) -> Result<HttpBackend> {
    HttpBackend::new(
        settings.api_base_url.clone(),
        settings.currency.clone(),
        settings.request_timeout(),
        session,
    )
    .into_diagnostic()
}

/// Pending-payment store plus whether it outlives the process.
struct PendingLedger {
    store: PendingPaymentStoreBox,
    durable: bool,
}

impl PendingLedger {
    fn in_memory() -> Self {
        Self {
            store: Box::new(InMemoryPendingStore::new()),
            durable: false,
        }
    }
}

fn pending_store(db_path: Option<PathBuf>) -> Result<PendingLedger> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => Ok(PendingLedger {
            store: Box::new(RocksDBStore::open(path).into_diagnostic()?),
            durable: true,
        }),
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(PendingLedger::in_memory())
        }
        None => Ok(PendingLedger::in_memory()),
    }
}
