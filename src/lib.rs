//! Typed async client for the NHN Cloud RDS APIs (MySQL, MariaDB, PostgreSQL).
//!
//! Every call goes through the same pipeline: an [`auth::Authenticator`] adds
//! credential headers, the [`transport::Transport`] sends the request, and
//! [`response::parse_response`] classifies the reply into a typed value or an
//! [`RdsError`].
//!
//! ```no_run
//! use nhncloud_rds::{ClientConfig, Credentials, MySqlClient, RdsApi};
//!
//! # async fn run() -> nhncloud_rds::Result<()> {
//! let config = ClientConfig::new(
//!     "kr1",
//!     "app-key",
//!     Credentials::RefreshingBearer {
//!         access_key: "access".into(),
//!         secret_key: "secret".into(),
//!     },
//! );
//! let client = MySqlClient::new(&config)?;
//! for instance in client.list_db_instances().await? {
//!     println!("{} {}", instance.db_instance_id, instance.db_instance_name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod rds;
pub mod response;
pub mod transport;

pub use config::{ClientConfig, Credentials, RetryConfig, TransportConfig};
pub use error::{RdsError, Result, TokenError};
pub use rds::{
    MariaDbClient, MySqlClient, PostgresClient, RdsApi, SchemaApi, ServiceClient, ServiceFamily,
};
