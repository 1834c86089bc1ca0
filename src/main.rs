//! `TollTag` startup binary: initializes the store and runs the ledger
//! reconciliation sweep, reporting any vehicle whose balance is ahead of its
//! ledger so an operator can reconcile it manually.

use dotenvy::dotenv;
use tolltag::config;
use tolltag::core::recharge;
use tolltag::errors::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (non-fatal, env vars can be set externally)
    dotenv().ok();

    // 3. Load the recharge policy
    let policy = config::recharge::load_default_policy()
        .inspect_err(|e| error!("Failed to load recharge policy: {e}"))?;
    info!(
        min_amount = policy.min_amount,
        amount_step = policy.amount_step,
        gateway_delay_ms = policy.gateway_delay_ms,
        "Recharge policy loaded."
    );

    // 4. Initialize the database
    let db = config::database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    config::database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {e}"))?;

    // 5. Reconciliation sweep: flag balances without matching ledger entries
    let discrepancies = recharge::find_ledger_discrepancies(&db).await?;
    if discrepancies.is_empty() {
        info!("Ledger reconciliation sweep found no discrepancies.");
    } else {
        for d in &discrepancies {
            error!(
                vehicle_id = d.vehicle_id,
                vehicle_number = %d.vehicle_number,
                balance = d.balance,
                ledger_total = d.ledger_total,
                "Balance is ahead of the ledger; manual reconciliation required."
            );
        }
    }

    Ok(())
}
