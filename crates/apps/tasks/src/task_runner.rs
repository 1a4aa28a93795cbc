use app_state::AppSettings;
use color_eyre::Result;
use common_services::maintenance::sweep_orphaned_images;
use sqlx::PgPool;
use tracing::info;

/// Runs every maintenance task once.
pub async fn run_tasks(pool: &PgPool, settings: &AppSettings) -> Result<()> {
    let maintenance = &settings.maintenance;
    if maintenance.dry_run {
        info!("Dry run, orphaned images are reported but kept.");
    }

    let report = sweep_orphaned_images(
        pool,
        settings.images_dir(),
        maintenance.orphan_grace(),
        maintenance.dry_run,
    )
    .await?;
    info!(
        "Scanned {} images, {} referenced, {} too recent to judge, {} orphaned, {} removed.",
        report.scanned,
        report.referenced,
        report.too_recent,
        report.orphans.len(),
        report.removed
    );

    Ok(())
}
