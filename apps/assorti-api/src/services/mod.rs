//! # Service Layer
//!
//! Validation and business rules between handlers and repositories.
//! Every function takes the [`Database`](assorti_db::Database) handle and
//! returns [`ApiResult`](crate::error::ApiResult); handlers only unpack
//! requests and wrap results in the envelope.
//!
//! ```text
//! ┌────────────┐   payload   ┌────────────┐  New*/patch  ┌──────────────┐
//! │  handlers  │────────────►│  services  │─────────────►│ repositories │
//! │  (axum)    │◄────────────│            │◄─────────────│ (assorti-db) │
//! └────────────┘  ApiResult  └────────────┘   DbResult   └──────────────┘
//! ```

pub mod categories;
pub mod orders;
pub mod products;
pub mod qrcodes;
pub mod sales;

use assorti_core::ValidationError;
use assorti_db::DbError;

use crate::error::ApiError;

/// Deletes fail with a foreign key violation while other rows still
/// reference the record.
pub(crate) fn in_use(entity: &str) -> impl FnOnce(DbError) -> ApiError + '_ {
    move |err| match err {
        DbError::ForeignKeyViolation { .. } => ValidationError::InUse {
            entity: entity.to_string(),
        }
        .into(),
        other => other.into(),
    }
}
