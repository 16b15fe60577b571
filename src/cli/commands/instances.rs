use nhncloud_rds::RdsApi;

pub async fn list(client: &dyn RdsApi, json: bool) -> anyhow::Result<()> {
    let instances = client.list_db_instances().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&instances)?);
        return Ok(());
    }

    if instances.is_empty() {
        println!("No DB instances found.");
        return Ok(());
    }

    println!("DB instances:\n");
    for instance in instances {
        println!(
            "  {} ({}): {} [{}]",
            instance.db_instance_name,
            instance.db_instance_id,
            instance.db_version,
            instance.db_instance_status.as_str()
        );
    }
    Ok(())
}

pub async fn show(client: &dyn RdsApi, id: &str) -> anyhow::Result<()> {
    let detail = client.get_db_instance(id).await?;
    let instance = &detail.instance;

    println!("Name:       {}", instance.db_instance_name);
    println!("ID:         {}", instance.db_instance_id);
    println!("Version:    {}", instance.db_version);
    println!("Status:     {}", instance.db_instance_status.as_str());
    if let Some(port) = instance.db_port {
        println!("Port:       {}", port);
    }
    if let Some(flavor) = &detail.db_flavor_id {
        println!("Flavor:     {}", flavor);
    }
    if let Some(group) = &detail.parameter_group_id {
        println!("Parameters: {}", group);
    }
    if !detail.db_security_group_ids.is_empty() {
        println!("Security:   {}", detail.db_security_group_ids.join(", "));
    }
    println!(
        "Deletion protection: {}",
        if detail.use_deletion_protection { "on" } else { "off" }
    );
    Ok(())
}
