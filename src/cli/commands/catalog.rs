use nhncloud_rds::RdsApi;

pub async fn versions(client: &dyn RdsApi) -> anyhow::Result<()> {
    for version in client.list_db_versions().await? {
        match version.db_version_name {
            Some(name) => println!("  {} ({})", version.db_version, name),
            None => println!("  {}", version.db_version),
        }
    }
    Ok(())
}

pub async fn flavors(client: &dyn RdsApi) -> anyhow::Result<()> {
    for flavor in client.list_db_flavors().await? {
        println!(
            "  {} ({}): {} vCPU, {} MB",
            flavor.db_flavor_name, flavor.db_flavor_id, flavor.vcpus, flavor.ram
        );
    }
    Ok(())
}
