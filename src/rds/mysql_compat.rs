// MySQL and MariaDB clients with their shared DB schema operations
use super::{validate, RdsApi, ServiceFamily};
use crate::error::Result;
use crate::impl_response_envelope;
use crate::models::{JobResponse, ResponseHeader};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const DB_SCHEMA_NAME_LENGTH: std::ops::RangeInclusive<usize> = 1..=64;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DbSchema {
    pub db_schema_id: String,
    pub db_schema_name: String,
    #[serde(default)]
    pub db_schema_status: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateDbSchemaRequest {
    pub db_schema_name: String,
}

impl CreateDbSchemaRequest {
    pub fn new(db_schema_name: impl Into<String>) -> Self {
        Self {
            db_schema_name: db_schema_name.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate::length("dbSchemaName", &self.db_schema_name, DB_SCHEMA_NAME_LENGTH)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbSchemasResponse {
    pub header: ResponseHeader,
    #[serde(default)]
    pub db_schemas: Vec<DbSchema>,
}

impl_response_envelope!(DbSchemasResponse);

/// Schemas live inside an instance on the MySQL-compatible services.
#[async_trait]
pub trait SchemaApi: RdsApi {
    async fn list_db_schemas(&self, db_instance_id: &str) -> Result<Vec<DbSchema>> {
        let svc = self.service();
        let id = validate::path_id("dbInstanceId", db_instance_id)?;
        let resp: DbSchemasResponse = svc
            .transport()
            .get(&svc.path(&format!("db-instances/{}/db-schemas", id)))
            .await?;
        Ok(resp.db_schemas)
    }

    async fn create_db_schema(
        &self,
        db_instance_id: &str,
        request: &CreateDbSchemaRequest,
    ) -> Result<String> {
        let svc = self.service();
        let id = validate::path_id("dbInstanceId", db_instance_id)?;
        request.validate()?;
        let resp: JobResponse = svc
            .transport()
            .post(&svc.path(&format!("db-instances/{}/db-schemas", id)), request)
            .await?;
        Ok(resp.job_id)
    }

    async fn delete_db_schema(&self, db_instance_id: &str, db_schema_id: &str) -> Result<String> {
        let svc = self.service();
        let id = validate::path_id("dbInstanceId", db_instance_id)?;
        let schema = validate::path_id("dbSchemaId", db_schema_id)?;
        let resp: JobResponse = svc
            .transport()
            .delete(&svc.path(&format!("db-instances/{}/db-schemas/{}", id, schema)))
            .await?;
        Ok(resp.job_id)
    }
}

service_client!(
    /// Client for the RDS for MySQL API (`v3.0`)
    MySqlClient,
    ServiceFamily::MySql
);

service_client!(
    /// Client for the RDS for MariaDB API (`v3.0`)
    MariaDbClient,
    ServiceFamily::MariaDb
);

impl SchemaApi for MySqlClient {}
impl SchemaApi for MariaDbClient {}
