// PostgreSQL client: databases and HBA rules on top of the common operations
use super::{validate, ServiceFamily};
use crate::error::{RdsError, Result};
use crate::impl_response_envelope;
use crate::models::{JobResponse, ResponseHeader};
use serde::{Deserialize, Serialize};

pub const DATABASE_NAME_LENGTH: std::ops::RangeInclusive<usize> = 1..=63;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    pub database_id: String,
    pub database_name: String,
    #[serde(default)]
    pub database_status: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateDatabaseRequest {
    pub database_name: String,
}

impl CreateDatabaseRequest {
    pub fn new(database_name: impl Into<String>) -> Self {
        Self {
            database_name: database_name.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate::length("databaseName", &self.database_name, DATABASE_NAME_LENGTH)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HbaConnectionType {
    Host,
    Hostssl,
    Hostnossl,
}

/// Whether a rule targets every database/user or an explicit list
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplyType {
    Entire,
    UserDefined,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HbaAuthMethod {
    Trust,
    Reject,
    Md5,
    #[serde(rename = "SCRAM_SHA_256")]
    ScramSha256,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HbaDatabaseTarget {
    pub applicable_type: ApplyType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub database_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HbaUserTarget {
    pub applicable_type: ApplyType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub db_user_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HbaRule {
    pub hba_rule_id: String,
    #[serde(default)]
    pub order: Option<u32>,
    #[serde(default)]
    pub hba_rule_status: Option<String>,
    pub connection_type: HbaConnectionType,
    pub database: HbaDatabaseTarget,
    pub user: HbaUserTarget,
    pub address: String,
    pub auth_method: HbaAuthMethod,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateHbaRuleRequest {
    pub connection_type: HbaConnectionType,
    pub database: HbaDatabaseTarget,
    pub user: HbaUserTarget,
    /// CIDR the rule matches, e.g. `10.0.0.0/24`
    pub address: String,
    pub auth_method: HbaAuthMethod,
}

impl CreateHbaRuleRequest {
    /// Rule covering every database and user from `address`.
    pub fn entire(address: impl Into<String>, auth_method: HbaAuthMethod) -> Self {
        Self {
            connection_type: HbaConnectionType::Host,
            database: HbaDatabaseTarget {
                applicable_type: ApplyType::Entire,
                database_ids: Vec::new(),
            },
            user: HbaUserTarget {
                applicable_type: ApplyType::Entire,
                db_user_ids: Vec::new(),
            },
            address: address.into(),
            auth_method,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate::require("address", &self.address)?;
        if self.database.applicable_type == ApplyType::UserDefined
            && self.database.database_ids.is_empty()
        {
            return Err(RdsError::validation(
                "database.databaseIds",
                "at least one database is required when the apply type is USER_DEFINED",
            ));
        }
        if self.user.applicable_type == ApplyType::UserDefined && self.user.db_user_ids.is_empty()
        {
            return Err(RdsError::validation(
                "user.dbUserIds",
                "at least one user is required when the apply type is USER_DEFINED",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabasesResponse {
    pub header: ResponseHeader,
    #[serde(default)]
    pub databases: Vec<Database>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HbaRulesResponse {
    pub header: ResponseHeader,
    #[serde(default)]
    pub hba_rules: Vec<HbaRule>,
}

impl_response_envelope!(DatabasesResponse, HbaRulesResponse);

service_client!(
    /// Client for the RDS for PostgreSQL API (`v1.0`)
    PostgresClient,
    ServiceFamily::PostgreSql
);

impl PostgresClient {
    fn instance_path(&self, db_instance_id: &str, rest: &str) -> Result<String> {
        let id = validate::path_id("dbInstanceId", db_instance_id)?;
        Ok(self.inner.path(&format!("db-instances/{}/{}", id, rest)))
    }

    pub async fn list_databases(&self, db_instance_id: &str) -> Result<Vec<Database>> {
        let path = self.instance_path(db_instance_id, "databases")?;
        let resp: DatabasesResponse = self.inner.transport().get(&path).await?;
        Ok(resp.databases)
    }

    pub async fn create_database(
        &self,
        db_instance_id: &str,
        request: &CreateDatabaseRequest,
    ) -> Result<String> {
        let path = self.instance_path(db_instance_id, "databases")?;
        request.validate()?;
        let resp: JobResponse = self.inner.transport().post(&path, request).await?;
        Ok(resp.job_id)
    }

    pub async fn delete_database(&self, db_instance_id: &str, database_id: &str) -> Result<String> {
        let database = validate::path_id("databaseId", database_id)?;
        let path = self.instance_path(db_instance_id, &format!("databases/{}", database))?;
        let resp: JobResponse = self.inner.transport().delete(&path).await?;
        Ok(resp.job_id)
    }

    pub async fn list_hba_rules(&self, db_instance_id: &str) -> Result<Vec<HbaRule>> {
        let path = self.instance_path(db_instance_id, "hba-rules")?;
        let resp: HbaRulesResponse = self.inner.transport().get(&path).await?;
        Ok(resp.hba_rules)
    }

    pub async fn create_hba_rule(
        &self,
        db_instance_id: &str,
        request: &CreateHbaRuleRequest,
    ) -> Result<String> {
        let path = self.instance_path(db_instance_id, "hba-rules")?;
        request.validate()?;
        let resp: JobResponse = self.inner.transport().post(&path, request).await?;
        Ok(resp.job_id)
    }

    pub async fn delete_hba_rule(&self, db_instance_id: &str, hba_rule_id: &str) -> Result<String> {
        let rule = validate::path_id("hbaRuleId", hba_rule_id)?;
        let path = self.instance_path(db_instance_id, &format!("hba-rules/{}", rule))?;
        let resp: JobResponse = self.inner.transport().delete(&path).await?;
        Ok(resp.job_id)
    }

    /// Reload pending HBA rule changes on the instance.
    pub async fn apply_hba_rules(&self, db_instance_id: &str) -> Result<String> {
        let path = self.instance_path(db_instance_id, "hba-rules/apply")?;
        let resp: JobResponse = self.inner.transport().post_empty(&path).await?;
        Ok(resp.job_id)
    }
}
