//! Backend service abstraction.
//!
//! The three remote collaborators (object store, document store, auth
//! provider) sit behind traits so the seeding logic can run against either
//! the real Firebase REST surface or local/in-memory implementations in
//! tests.

mod api;
mod firebase;
mod local;
mod value;

pub use api::{
    AuthProvider, BackendError, BackendResult, DocumentStore, DocumentWrite, ObjectStore,
    UserLookup,
};
pub use firebase::FirebaseBackend;
pub use local::{LocalAuthProvider, LocalDocumentStore, LocalObjectStore};
