// RDS resource clients

/// Declares a family client wrapping a [`ServiceClient`]: the three
/// constructors plus the [`RdsApi`] impl. Must precede the family modules.
macro_rules! service_client {
    ($(#[$meta:meta])* $name:ident, $family:expr) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name {
            inner: $crate::rds::ServiceClient,
        }

        impl $name {
            pub fn new(config: &$crate::config::ClientConfig) -> $crate::error::Result<Self> {
                Self::with_transport_config(config, &$crate::config::TransportConfig::default())
            }

            pub fn with_transport_config(
                config: &$crate::config::ClientConfig,
                transport_config: &$crate::config::TransportConfig,
            ) -> $crate::error::Result<Self> {
                let inner = $crate::rds::ServiceClient::connect(config, $family, transport_config)?;
                Ok(Self { inner })
            }

            /// Use `authenticator` instead of the one implied by `config.credentials`.
            pub fn with_authenticator(
                config: &$crate::config::ClientConfig,
                transport_config: &$crate::config::TransportConfig,
                authenticator: std::sync::Arc<dyn $crate::auth::Authenticator>,
            ) -> $crate::error::Result<Self> {
                let inner = $crate::rds::ServiceClient::with_authenticator(
                    config,
                    $family,
                    transport_config,
                    authenticator,
                )?;
                Ok(Self { inner })
            }
        }

        impl $crate::rds::RdsApi for $name {
            fn service(&self) -> &$crate::rds::ServiceClient {
                &self.inner
            }
        }
    };
}

mod mysql_compat;
mod postgres;
pub mod schema;
mod validate;

pub use mysql_compat::{
    CreateDbSchemaRequest, DbSchema, DbSchemasResponse, MariaDbClient, MySqlClient, SchemaApi,
};
pub use postgres::{
    ApplyType, CreateDatabaseRequest, CreateHbaRuleRequest, Database, DatabasesResponse,
    HbaAuthMethod, HbaConnectionType, HbaDatabaseTarget, HbaRule, HbaRulesResponse,
    HbaUserTarget, PostgresClient,
};

use crate::auth::{
    Authenticator, BearerAuthenticator, FileTokenStore, OAuth2HeaderAuthenticator,
    RefreshingTokenAuthenticator,
};
use crate::config::{ClientConfig, Credentials, TransportConfig};
use crate::error::Result;
use crate::models::JobResponse;
use crate::transport::{service_base_url, Transport};
use async_trait::async_trait;
use schema::*;
use std::ops::RangeInclusive;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceFamily {
    MySql,
    MariaDb,
    PostgreSql,
}

impl ServiceFamily {
    /// Host label between the region and the API domain
    pub fn service_suffix(self) -> &'static str {
        match self {
            Self::MySql => "rds-mysql",
            Self::MariaDb => "rds-mariadb",
            Self::PostgreSql => "rds-postgres",
        }
    }

    pub fn api_version(self) -> &'static str {
        match self {
            Self::MySql | Self::MariaDb => "v3.0",
            Self::PostgreSql => "v1.0",
        }
    }

    /// Name of the token cache file for this service
    pub fn cache_name(self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::MariaDb => "mariadb",
            Self::PostgreSql => "postgres",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::MySql => "MySQL",
            Self::MariaDb => "MariaDB",
            Self::PostgreSql => "PostgreSQL",
        }
    }

    pub fn port_range(self) -> RangeInclusive<u16> {
        match self {
            Self::MySql | Self::MariaDb => 3306..=43306,
            Self::PostgreSql => 5432..=45432,
        }
    }

    pub fn supports_auth_plugin(self, plugin: AuthenticationPlugin) -> bool {
        use AuthenticationPlugin::*;
        match self {
            Self::MySql => matches!(plugin, Native | Sha256 | CachingSha2),
            Self::MariaDb => matches!(plugin, Native | Ed25519),
            Self::PostgreSql => false,
        }
    }

    /// Versioned API path, e.g. `/v3.0/db-instances`
    pub fn path(self, resource: &str) -> String {
        format!("/{}/{}", self.api_version(), resource)
    }
}

/// Pick the authenticator matching the configured credentials.
pub fn authenticator_for(
    config: &ClientConfig,
    family: ServiceFamily,
) -> Result<Arc<dyn Authenticator>> {
    let authenticator: Arc<dyn Authenticator> = match &config.credentials {
        Credentials::OAuth2 {
            access_key,
            secret_key,
        } => Arc::new(OAuth2HeaderAuthenticator::new(
            config.app_key.clone(),
            access_key.clone(),
            secret_key.clone(),
        )),
        Credentials::Bearer { token } => Arc::new(BearerAuthenticator::new(
            config.app_key.clone(),
            token.clone(),
        )),
        Credentials::RefreshingBearer {
            access_key,
            secret_key,
        } => {
            let store = FileTokenStore::for_service(family.cache_name())?;
            Arc::new(RefreshingTokenAuthenticator::new(
                config.app_key.clone(),
                access_key.clone(),
                secret_key.clone(),
                Arc::new(store),
            )?)
        }
    };
    Ok(authenticator)
}

/// Transport plus the service family it talks to
#[derive(Debug)]
pub struct ServiceClient {
    transport: Transport,
    family: ServiceFamily,
}

impl ServiceClient {
    /// Validate `config`, then wire the authenticator and transport for `family`.
    pub fn connect(
        config: &ClientConfig,
        family: ServiceFamily,
        transport_config: &TransportConfig,
    ) -> Result<Self> {
        config.validate()?;
        let authenticator = authenticator_for(config, family)?;
        Self::with_authenticator(config, family, transport_config, authenticator)
    }

    pub fn with_authenticator(
        config: &ClientConfig,
        family: ServiceFamily,
        transport_config: &TransportConfig,
        authenticator: Arc<dyn Authenticator>,
    ) -> Result<Self> {
        config.validate()?;
        let base_url = transport_config
            .base_url
            .clone()
            .unwrap_or_else(|| service_base_url(&config.region, family.service_suffix()));
        let transport = Transport::new(&base_url, authenticator, transport_config)?;
        Ok(Self { transport, family })
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn family(&self) -> ServiceFamily {
        self.family
    }

    pub fn path(&self, resource: &str) -> String {
        self.family.path(resource)
    }
}

/// Operations every RDS family offers
#[async_trait]
pub trait RdsApi: Send + Sync {
    fn service(&self) -> &ServiceClient;

    async fn list_db_instances(&self) -> Result<Vec<DbInstance>> {
        let svc = self.service();
        let resp: DbInstancesResponse = svc.transport().get(&svc.path("db-instances")).await?;
        Ok(resp.db_instances)
    }

    async fn get_db_instance(&self, db_instance_id: &str) -> Result<DbInstanceDetail> {
        let svc = self.service();
        let id = validate::path_id("dbInstanceId", db_instance_id)?;
        let resp: DbInstanceResponse = svc
            .transport()
            .get(&svc.path(&format!("db-instances/{}", id)))
            .await?;
        Ok(resp.db_instance)
    }

    /// Returns the job id of the asynchronous creation.
    async fn create_db_instance(&self, request: &CreateDbInstanceRequest) -> Result<String> {
        let svc = self.service();
        request.validate(svc.family())?;
        let resp: JobResponse = svc
            .transport()
            .post(&svc.path("db-instances"), request)
            .await?;
        Ok(resp.job_id)
    }

    async fn modify_db_instance(
        &self,
        db_instance_id: &str,
        request: &ModifyDbInstanceRequest,
    ) -> Result<String> {
        let svc = self.service();
        let id = validate::path_id("dbInstanceId", db_instance_id)?;
        request.validate(svc.family())?;
        let resp: JobResponse = svc
            .transport()
            .put(&svc.path(&format!("db-instances/{}", id)), request)
            .await?;
        Ok(resp.job_id)
    }

    async fn delete_db_instance(&self, db_instance_id: &str) -> Result<String> {
        let svc = self.service();
        let id = validate::path_id("dbInstanceId", db_instance_id)?;
        let resp: JobResponse = svc
            .transport()
            .delete(&svc.path(&format!("db-instances/{}", id)))
            .await?;
        Ok(resp.job_id)
    }

    async fn start_db_instance(&self, db_instance_id: &str) -> Result<String> {
        instance_action(self.service(), db_instance_id, "start").await
    }

    async fn stop_db_instance(&self, db_instance_id: &str) -> Result<String> {
        instance_action(self.service(), db_instance_id, "stop").await
    }

    async fn restart_db_instance(&self, db_instance_id: &str) -> Result<String> {
        instance_action(self.service(), db_instance_id, "restart").await
    }

    async fn list_db_versions(&self) -> Result<Vec<DbVersion>> {
        let svc = self.service();
        let resp: DbVersionsResponse = svc.transport().get(&svc.path("db-versions")).await?;
        Ok(resp.db_versions)
    }

    async fn list_db_flavors(&self) -> Result<Vec<DbFlavor>> {
        let svc = self.service();
        let resp: DbFlavorsResponse = svc.transport().get(&svc.path("db-flavors")).await?;
        Ok(resp.db_flavors)
    }

    async fn list_storage_types(&self) -> Result<Vec<String>> {
        let svc = self.service();
        let resp: StorageTypesResponse = svc.transport().get(&svc.path("storage-types")).await?;
        Ok(resp.storage_types)
    }

    async fn list_subnets(&self) -> Result<Vec<Subnet>> {
        let svc = self.service();
        let resp: SubnetsResponse = svc.transport().get(&svc.path("network/subnets")).await?;
        Ok(resp.subnets)
    }

    async fn list_parameter_groups(&self) -> Result<Vec<ParameterGroup>> {
        let svc = self.service();
        let resp: ParameterGroupsResponse =
            svc.transport().get(&svc.path("parameter-groups")).await?;
        Ok(resp.parameter_groups)
    }

    async fn get_parameter_group(&self, parameter_group_id: &str) -> Result<ParameterGroupDetail> {
        let svc = self.service();
        let id = validate::path_id("parameterGroupId", parameter_group_id)?;
        let resp: ParameterGroupResponse = svc
            .transport()
            .get(&svc.path(&format!("parameter-groups/{}", id)))
            .await?;
        Ok(resp.parameter_group)
    }

    async fn list_db_security_groups(&self) -> Result<Vec<DbSecurityGroup>> {
        let svc = self.service();
        let resp: DbSecurityGroupsResponse =
            svc.transport().get(&svc.path("db-security-groups")).await?;
        Ok(resp.db_security_groups)
    }

    async fn get_db_security_group(&self, db_security_group_id: &str) -> Result<DbSecurityGroup> {
        let svc = self.service();
        let id = validate::path_id("dbSecurityGroupId", db_security_group_id)?;
        let resp: DbSecurityGroupResponse = svc
            .transport()
            .get(&svc.path(&format!("db-security-groups/{}", id)))
            .await?;
        Ok(resp.db_security_group)
    }

    /// Returns the id of the new security group.
    async fn create_db_security_group(
        &self,
        request: &CreateDbSecurityGroupRequest,
    ) -> Result<String> {
        let svc = self.service();
        request.validate()?;
        let resp: CreateDbSecurityGroupResponse = svc
            .transport()
            .post(&svc.path("db-security-groups"), request)
            .await?;
        Ok(resp.db_security_group_id)
    }

    async fn delete_db_security_group(&self, db_security_group_id: &str) -> Result<()> {
        let svc = self.service();
        let id = validate::path_id("dbSecurityGroupId", db_security_group_id)?;
        let _: crate::models::HeaderOnlyResponse = svc
            .transport()
            .delete(&svc.path(&format!("db-security-groups/{}", id)))
            .await?;
        Ok(())
    }

    /// List backups, optionally only those of one instance.
    async fn list_backups(&self, db_instance_id: Option<&str>) -> Result<Vec<Backup>> {
        let svc = self.service();
        let mut query = Vec::new();
        if let Some(id) = db_instance_id {
            validate::require("dbInstanceId", id)?;
            query.push(("dbInstanceId", id.to_string()));
        }
        let resp: BackupsResponse = svc
            .transport()
            .get_with_query(&svc.path("backups"), &query)
            .await?;
        Ok(resp.backups)
    }

    async fn create_backup(
        &self,
        db_instance_id: &str,
        request: &CreateBackupRequest,
    ) -> Result<String> {
        let svc = self.service();
        let id = validate::path_id("dbInstanceId", db_instance_id)?;
        request.validate()?;
        let resp: JobResponse = svc
            .transport()
            .post(&svc.path(&format!("db-instances/{}/backup", id)), request)
            .await?;
        Ok(resp.job_id)
    }

    async fn delete_backup(&self, backup_id: &str) -> Result<String> {
        let svc = self.service();
        let id = validate::path_id("backupId", backup_id)?;
        let resp: JobResponse = svc
            .transport()
            .delete(&svc.path(&format!("backups/{}", id)))
            .await?;
        Ok(resp.job_id)
    }

    async fn list_user_groups(&self) -> Result<Vec<UserGroup>> {
        let svc = self.service();
        let resp: UserGroupsResponse = svc.transport().get(&svc.path("user-groups")).await?;
        Ok(resp.user_groups)
    }

    async fn get_user_group(&self, user_group_id: &str) -> Result<UserGroupDetail> {
        let svc = self.service();
        let id = validate::path_id("userGroupId", user_group_id)?;
        let resp: UserGroupResponse = svc
            .transport()
            .get(&svc.path(&format!("user-groups/{}", id)))
            .await?;
        Ok(resp.user_group)
    }

    async fn get_job(&self, job_id: &str) -> Result<Job> {
        let svc = self.service();
        let id = validate::path_id("jobId", job_id)?;
        let resp: JobStatusResponse = svc
            .transport()
            .get(&svc.path(&format!("jobs/{}", id)))
            .await?;
        Ok(resp.job)
    }

    async fn list_db_users(&self, db_instance_id: &str) -> Result<Vec<DbUser>> {
        let svc = self.service();
        let id = validate::path_id("dbInstanceId", db_instance_id)?;
        let resp: DbUsersResponse = svc
            .transport()
            .get(&svc.path(&format!("db-instances/{}/db-users", id)))
            .await?;
        Ok(resp.db_users)
    }

    async fn create_db_user(
        &self,
        db_instance_id: &str,
        request: &CreateDbUserRequest,
    ) -> Result<String> {
        let svc = self.service();
        let id = validate::path_id("dbInstanceId", db_instance_id)?;
        request.validate(svc.family())?;
        let resp: JobResponse = svc
            .transport()
            .post(&svc.path(&format!("db-instances/{}/db-users", id)), request)
            .await?;
        Ok(resp.job_id)
    }

    async fn delete_db_user(&self, db_instance_id: &str, db_user_id: &str) -> Result<String> {
        let svc = self.service();
        let id = validate::path_id("dbInstanceId", db_instance_id)?;
        let user = validate::path_id("dbUserId", db_user_id)?;
        let resp: JobResponse = svc
            .transport()
            .delete(&svc.path(&format!("db-instances/{}/db-users/{}", id, user)))
            .await?;
        Ok(resp.job_id)
    }
}

async fn instance_action(svc: &ServiceClient, db_instance_id: &str, action: &str) -> Result<String> {
    let id = validate::path_id("dbInstanceId", db_instance_id)?;
    let resp: JobResponse = svc
        .transport()
        .post_empty(&svc.path(&format!("db-instances/{}/{}", id, action)))
        .await?;
    Ok(resp.job_id)
}
