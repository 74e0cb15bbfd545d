use media_sync_models::ItemError;
use media_sync_sources::SourceError;
use thiserror::Error;

/// Failure that ends a sync run
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failure while trying to {operation}")]
    Remote {
        operation: String,
        #[source]
        source: SourceError,
    },

    #[error("invalid item while trying to {context}")]
    Item {
        context: String,
        #[source]
        source: ItemError,
    },
}

impl SyncError {
    pub fn remote(operation: impl Into<String>, source: SourceError) -> Self {
        SyncError::Remote {
            operation: operation.into(),
            source,
        }
    }

    pub fn item(context: impl Into<String>, source: ItemError) -> Self {
        SyncError::Item {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

/// Attach operation context to a client result
pub(crate) trait RemoteContext<T> {
    fn remote(self, operation: impl FnOnce() -> String) -> Result<T>;
}

impl<T> RemoteContext<T> for std::result::Result<T, SourceError> {
    fn remote(self, operation: impl FnOnce() -> String) -> Result<T> {
        self.map_err(|source| SyncError::remote(operation(), source))
    }
}
