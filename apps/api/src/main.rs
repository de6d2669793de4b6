use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use appointment_cell::services::BookingService;
use notification_cell::services::{OutboxMailer, ReminderScheduler};
use patient_cell::services::PatientDirectory;
use scheduling_cell::router::SchedulingState;
use scheduling_cell::services::{ScheduleGenerator, ScheduleTemplate, SlotAllocator, SlotCatalog};
use shared_config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting clinic scheduling API server");

    // Load configuration and wire the cells together
    let config = AppConfig::from_env();
    config.ensure_dirs()?;

    let catalog = Arc::new(SlotCatalog::open(config.schedule_path())?);
    let allocator = Arc::new(SlotAllocator::new(catalog.clone()));
    let generator = Arc::new(ScheduleGenerator::new(
        catalog.clone(),
        ScheduleTemplate::default(),
    ));
    let scheduling = Arc::new(SchedulingState {
        allocator: allocator.clone(),
        generator,
    });

    let patients = Arc::new(PatientDirectory::open(config.patients_path())?);
    let mailer = Arc::new(OutboxMailer::new(&config));
    let reminders = Arc::new(ReminderScheduler::open(
        config.reminders_path(),
        mailer.clone(),
    )?);
    let booking = Arc::new(BookingService::new(
        &config,
        allocator,
        patients.clone(),
        reminders.clone(),
        mailer,
    )?);

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(patients, scheduling, booking, reminders)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
