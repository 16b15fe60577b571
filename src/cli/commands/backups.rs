use nhncloud_rds::RdsApi;

pub async fn list(client: &dyn RdsApi, instance: Option<&str>) -> anyhow::Result<()> {
    let backups = client.list_backups(instance).await?;
    if backups.is_empty() {
        println!("No backups found.");
        return Ok(());
    }

    for backup in backups {
        println!(
            "  {} ({}): {} {}",
            backup.backup_name,
            backup.backup_id,
            backup.backup_status,
            backup.created_yyyy_mm_dd_hh_mm_ss.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
