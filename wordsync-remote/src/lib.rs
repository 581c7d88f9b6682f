//! Remote document stores for wordsync.
//!
//! - [`FirestoreStore`]: Firestore REST API, one atomic commit per group
//! - [`MongoDataApiStore`]: MongoDB Atlas Data API, applied phase by phase
//!
//! Both implement [`wordsync_core::RemoteStore`]. Firestore calls are
//! authorized through a [`CredentialProvider`].

pub mod credentials;
pub mod firestore;
pub mod mongo;

pub use credentials::{
    CredentialProvider, ServiceAccountCredentials, ServiceAccountKey, StaticToken,
    DATASTORE_SCOPE,
};
pub use firestore::{FirestoreConfig, FirestoreStore};
pub use mongo::{MongoConfig, MongoDataApiStore, DEFAULT_MONGO_COLLECTION, DEFAULT_MONGO_DATABASE};
