use database::{DatabaseConnectionInfo, PgDatabase};
use econtrol::client::EControlClient;
use price_tracking::{client::Client, scheduler};
use web::{start_web_server, WebState};

#[tokio::main]
async fn main() {
    env_logger::init();

    // database
    let database_connection_info = DatabaseConnectionInfo::from_env()
        .expect("expected database connection info in env.");
    let database = PgDatabase::connect(database_connection_info)
        .await
        .expect("could not connect to database.");

    // upstream price API
    let source = EControlClient::from_env()
        .expect("could not build the price API client.");

    // one recurring ingestion job per stored location
    let ingest_scheduler = scheduler::IngestScheduler::new(
        database.clone(),
        source,
        scheduler::interval_from_env(),
    );
    if let Err(why) = ingest_scheduler.schedule_all().await {
        log::error!("could not restore ingestion schedules: {why}");
    }

    // web server
    let web_future = start_web_server(WebState {
        price_client: Client::new(database),
        scheduler: ingest_scheduler,
    });

    let _ = web_future.await;
}
