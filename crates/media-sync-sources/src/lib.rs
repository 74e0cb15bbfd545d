pub mod error;
pub mod imdb;
pub mod traits;
pub mod trakt;

pub use error::SourceError;
pub use imdb::ImdbClient;
pub use traits::{MirrorClient, SourceClient};
pub use trakt::TraktClient;
