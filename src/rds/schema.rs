//! Resource records shared by the MySQL, MariaDB and PostgreSQL APIs.
//!
//! The three services expose the same JSON shapes for instances, catalogue
//! entries, security groups, parameter groups, backups and users. Fields that
//! only one family uses are optional here and checked per family in the
//! request `validate` methods.

use super::validate;
use super::ServiceFamily;
use crate::error::{RdsError, Result};
use crate::impl_response_envelope;
use crate::models::ResponseHeader;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DbInstanceStatus {
    Available,
    BeforeCreate,
    StorageFull,
    FailToCreate,
    FailToConnect,
    ReplicationStop,
    Failover,
    Shutdown,
    Deleted,
    #[serde(other)]
    Unknown,
}

impl DbInstanceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Available => "AVAILABLE",
            Self::BeforeCreate => "BEFORE_CREATE",
            Self::StorageFull => "STORAGE_FULL",
            Self::FailToCreate => "FAIL_TO_CREATE",
            Self::FailToConnect => "FAIL_TO_CONNECT",
            Self::ReplicationStop => "REPLICATION_STOP",
            Self::Failover => "FAILOVER",
            Self::Shutdown => "SHUTDOWN",
            Self::Deleted => "DELETED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DbInstance {
    pub db_instance_id: String,
    #[serde(default)]
    pub db_instance_group_id: Option<String>,
    pub db_instance_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub db_version: String,
    #[serde(default)]
    pub db_port: Option<u16>,
    #[serde(default)]
    pub db_instance_type: Option<String>,
    pub db_instance_status: DbInstanceStatus,
    #[serde(default)]
    pub progress_status: Option<String>,
    #[serde(default)]
    pub created_yyyy_mm_dd_hh_mm_ss: Option<String>,
    #[serde(default)]
    pub updated_yyyy_mm_dd_hh_mm_ss: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DbInstanceDetail {
    #[serde(flatten)]
    pub instance: DbInstance,
    #[serde(default)]
    pub db_flavor_id: Option<String>,
    #[serde(default)]
    pub parameter_group_id: Option<String>,
    #[serde(default)]
    pub db_security_group_ids: Vec<String>,
    #[serde(default)]
    pub notification_group_ids: Vec<String>,
    #[serde(default)]
    pub use_deletion_protection: bool,
    #[serde(default)]
    pub support_db_version_upgrade: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub subnet_id: String,
    #[serde(default)]
    pub use_public_access: bool,
    #[serde(default)]
    pub availability_zone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Storage {
    pub storage_type: String,
    pub storage_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BackupSchedule {
    pub backup_wnd_bgn_time: String,
    pub backup_wnd_duration: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_retry_expiry_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BackupPolicy {
    pub backup_period: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ftwrl_wait_timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_retry_count: Option<u32>,
    #[serde(default)]
    pub backup_schedules: Vec<BackupSchedule>,
}

pub const STORAGE_SIZE_GB: std::ops::RangeInclusive<u32> = 20..=2048;
pub const BACKUP_PERIOD_DAYS: std::ops::RangeInclusive<u32> = 0..=730;
pub const PASSWORD_LENGTH: std::ops::RangeInclusive<usize> = 4..=16;

/// Body of the create-instance call
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateDbInstanceRequest {
    pub db_instance_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub db_flavor_id: String,
    pub db_version: String,
    pub db_user_name: String,
    pub db_password: String,
    /// Initial database; required by PostgreSQL, ignored elsewhere
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_port: Option<u16>,
    pub parameter_group_id: String,
    pub db_security_group_ids: Vec<String>,
    pub user_group_ids: Vec<String>,
    pub use_high_availability: bool,
    pub use_deletion_protection: bool,
    pub network: Network,
    pub storage: Storage,
    pub backup: BackupPolicy,
}

impl CreateDbInstanceRequest {
    pub fn validate(&self, family: ServiceFamily) -> Result<()> {
        validate::length("dbInstanceName", &self.db_instance_name, 1..=100)?;
        validate::optional_length("description", self.description.as_deref(), 0..=255)?;
        validate::require("dbFlavorId", &self.db_flavor_id)?;
        validate::require("dbVersion", &self.db_version)?;
        validate::length("dbUserName", &self.db_user_name, 1..=32)?;
        validate::length("dbPassword", &self.db_password, PASSWORD_LENGTH)?;
        if let Some(port) = self.db_port {
            validate::range("dbPort", port, family.port_range())?;
        }
        validate::require("parameterGroupId", &self.parameter_group_id)?;
        validate::require("network.subnetId", &self.network.subnet_id)?;
        validate::require("storage.storageType", &self.storage.storage_type)?;
        validate::range("storage.storageSize", self.storage.storage_size, STORAGE_SIZE_GB)?;
        validate::range("backup.backupPeriod", self.backup.backup_period, BACKUP_PERIOD_DAYS)?;
        for schedule in &self.backup.backup_schedules {
            validate::require("backup.backupSchedules.backupWndBgnTime", &schedule.backup_wnd_bgn_time)?;
            validate::require("backup.backupSchedules.backupWndDuration", &schedule.backup_wnd_duration)?;
        }

        if family == ServiceFamily::PostgreSql {
            match self.database_name.as_deref() {
                Some(name) => validate::length("databaseName", name, 1..=63)?,
                None => return Err(RdsError::validation("databaseName", "is required")),
            }
        }
        Ok(())
    }
}

/// Body of the modify-instance call; unset fields are left unchanged
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ModifyDbInstanceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_instance_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_flavor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_security_group_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execute_backup: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_online_failover: Option<bool>,
}

impl ModifyDbInstanceRequest {
    pub fn validate(&self, family: ServiceFamily) -> Result<()> {
        if *self == Self::default() {
            return Err(RdsError::validation(
                "request",
                "at least one field must be set",
            ));
        }
        validate::optional_length("dbInstanceName", self.db_instance_name.as_deref(), 1..=100)?;
        validate::optional_length("description", self.description.as_deref(), 0..=255)?;
        if let Some(port) = self.db_port {
            validate::range("dbPort", port, family.port_range())?;
        }
        if let Some(flavor) = &self.db_flavor_id {
            validate::require("dbFlavorId", flavor)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DbVersion {
    pub db_version: String,
    #[serde(default)]
    pub db_version_name: Option<String>,
    #[serde(default)]
    pub restorable_from_obs: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DbFlavor {
    pub db_flavor_id: String,
    pub db_flavor_name: String,
    pub ram: u32,
    pub vcpus: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Subnet {
    pub subnet_id: String,
    pub subnet_name: String,
    pub subnet_cidr: String,
    #[serde(default)]
    pub usable_ip_address_count: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParameterGroup {
    pub parameter_group_id: String,
    pub parameter_group_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub db_version: String,
    #[serde(default)]
    pub parameter_group_status: Option<String>,
    #[serde(default)]
    pub created_yyyy_mm_dd_hh_mm_ss: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub parameter_id: String,
    pub parameter_name: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub allowed_value: Option<String>,
    #[serde(default)]
    pub apply_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParameterGroupDetail {
    #[serde(flatten)]
    pub parameter_group: ParameterGroup,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleDirection {
    Ingress,
    Egress,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EtherType {
    Ipv4,
    Ipv6,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PortType {
    DbPort,
    Port,
    PortRange,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PortSpec {
    pub port_type: PortType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_port: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecurityRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub direction: RuleDirection,
    pub ether_type: EtherType,
    pub port: PortSpec,
    pub cidr: String,
}

impl SecurityRule {
    fn validate(&self) -> Result<()> {
        validate::require("rules.cidr", &self.cidr)?;
        match self.port.port_type {
            PortType::DbPort => Ok(()),
            PortType::Port => match self.port.min_port {
                Some(_) => Ok(()),
                None => Err(RdsError::validation("rules.port.minPort", "is required for PORT")),
            },
            PortType::PortRange => match (self.port.min_port, self.port.max_port) {
                (Some(min), Some(max)) if min <= max => Ok(()),
                (Some(_), Some(_)) => Err(RdsError::validation(
                    "rules.port",
                    "minPort must not exceed maxPort",
                )),
                _ => Err(RdsError::validation(
                    "rules.port",
                    "minPort and maxPort are required for PORT_RANGE",
                )),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DbSecurityGroup {
    pub db_security_group_id: String,
    pub db_security_group_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub progress_status: Option<String>,
    #[serde(default)]
    pub rules: Vec<SecurityRule>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateDbSecurityGroupRequest {
    pub db_security_group_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub rules: Vec<SecurityRule>,
}

impl CreateDbSecurityGroupRequest {
    pub fn validate(&self) -> Result<()> {
        validate::length("dbSecurityGroupName", &self.db_security_group_name, 1..=100)?;
        validate::optional_length("description", self.description.as_deref(), 0..=255)?;
        if self.rules.is_empty() {
            return Err(RdsError::validation("rules", "at least one rule is required"));
        }
        self.rules.iter().try_for_each(SecurityRule::validate)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub backup_id: String,
    pub backup_name: String,
    pub backup_status: String,
    #[serde(default)]
    pub db_instance_id: Option<String>,
    #[serde(default)]
    pub db_version: Option<String>,
    #[serde(default)]
    pub backup_type: Option<String>,
    #[serde(default)]
    pub backup_size: Option<u64>,
    #[serde(default)]
    pub created_yyyy_mm_dd_hh_mm_ss: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateBackupRequest {
    pub backup_name: String,
}

impl CreateBackupRequest {
    pub fn new(backup_name: impl Into<String>) -> Self {
        Self {
            backup_name: backup_name.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate::length("backupName", &self.backup_name, 1..=100)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserGroup {
    pub user_group_id: String,
    pub user_group_name: String,
    #[serde(default)]
    pub created_yyyy_mm_dd_hh_mm_ss: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserGroupMember {
    pub member_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserGroupDetail {
    #[serde(flatten)]
    pub user_group: UserGroup,
    #[serde(default)]
    pub members: Vec<UserGroupMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: String,
    pub job_status: String,
    #[serde(default)]
    pub resource_id: Option<String>,
    #[serde(default)]
    pub created_yyyy_mm_dd_hh_mm_ss: Option<String>,
    #[serde(default)]
    pub updated_yyyy_mm_dd_hh_mm_ss: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorityType {
    Read,
    Crud,
    Ddl,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthenticationPlugin {
    Native,
    Sha256,
    #[serde(rename = "CACHING_SHA2")]
    CachingSha2,
    Ed25519,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DbUser {
    pub db_user_id: String,
    pub db_user_name: String,
    /// MySQL / MariaDB only
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub authority_type: Option<AuthorityType>,
    #[serde(default)]
    pub authentication_plugin: Option<AuthenticationPlugin>,
    #[serde(default)]
    pub db_user_status: Option<String>,
    #[serde(default)]
    pub created_yyyy_mm_dd_hh_mm_ss: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateDbUserRequest {
    pub db_user_name: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    pub authority_type: AuthorityType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_plugin: Option<AuthenticationPlugin>,
}

impl CreateDbUserRequest {
    pub fn validate(&self, family: ServiceFamily) -> Result<()> {
        validate::length("dbUserName", &self.db_user_name, 1..=32)?;
        validate::length("password", &self.password, PASSWORD_LENGTH)?;

        match family {
            ServiceFamily::MySql | ServiceFamily::MariaDb => {
                match self.host.as_deref() {
                    Some(host) => validate::length("host", host, 1..=255)?,
                    None => return Err(RdsError::validation("host", "is required")),
                }
                if let Some(plugin) = self.authentication_plugin {
                    if !family.supports_auth_plugin(plugin) {
                        return Err(RdsError::validation(
                            "authenticationPlugin",
                            format!("{:?} is not supported by {}", plugin, family.display_name()),
                        ));
                    }
                }
            }
            ServiceFamily::PostgreSql => {
                if self.host.is_some() {
                    return Err(RdsError::validation("host", "is not supported by PostgreSQL"));
                }
                if self.authentication_plugin.is_some() {
                    return Err(RdsError::validation(
                        "authenticationPlugin",
                        "is not supported by PostgreSQL",
                    ));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbInstancesResponse {
    pub header: ResponseHeader,
    #[serde(default)]
    pub db_instances: Vec<DbInstance>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbInstanceResponse {
    pub header: ResponseHeader,
    #[serde(flatten)]
    pub db_instance: DbInstanceDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbVersionsResponse {
    pub header: ResponseHeader,
    #[serde(default)]
    pub db_versions: Vec<DbVersion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbFlavorsResponse {
    pub header: ResponseHeader,
    #[serde(default)]
    pub db_flavors: Vec<DbFlavor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageTypesResponse {
    pub header: ResponseHeader,
    #[serde(default)]
    pub storage_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetsResponse {
    pub header: ResponseHeader,
    #[serde(default)]
    pub subnets: Vec<Subnet>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterGroupsResponse {
    pub header: ResponseHeader,
    #[serde(default)]
    pub parameter_groups: Vec<ParameterGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterGroupResponse {
    pub header: ResponseHeader,
    #[serde(flatten)]
    pub parameter_group: ParameterGroupDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbSecurityGroupsResponse {
    pub header: ResponseHeader,
    #[serde(default)]
    pub db_security_groups: Vec<DbSecurityGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbSecurityGroupResponse {
    pub header: ResponseHeader,
    #[serde(flatten)]
    pub db_security_group: DbSecurityGroup,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDbSecurityGroupResponse {
    pub header: ResponseHeader,
    pub db_security_group_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupsResponse {
    pub header: ResponseHeader,
    #[serde(default)]
    pub backups: Vec<Backup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGroupsResponse {
    pub header: ResponseHeader,
    #[serde(default)]
    pub user_groups: Vec<UserGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserGroupResponse {
    pub header: ResponseHeader,
    #[serde(flatten)]
    pub user_group: UserGroupDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub header: ResponseHeader,
    #[serde(flatten)]
    pub job: Job,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbUsersResponse {
    pub header: ResponseHeader,
    #[serde(default)]
    pub db_users: Vec<DbUser>,
}

impl_response_envelope!(
    DbInstancesResponse,
    DbInstanceResponse,
    DbVersionsResponse,
    DbFlavorsResponse,
    StorageTypesResponse,
    SubnetsResponse,
    ParameterGroupsResponse,
    ParameterGroupResponse,
    DbSecurityGroupsResponse,
    DbSecurityGroupResponse,
    CreateDbSecurityGroupResponse,
    BackupsResponse,
    UserGroupsResponse,
    UserGroupResponse,
    JobStatusResponse,
    DbUsersResponse,
);
