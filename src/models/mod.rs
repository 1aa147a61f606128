//! Request and Response models for the HTTP surfaces
//!
//! DTOs for request bodies, the shared response envelope, and the typed
//! payloads it carries.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{RestoreRequest, SaveDataRequest, SetKeyRequest, UpdateKeyRequest};
pub use responses::{
    ApiResponse, BackupData, CacheHealthData, CacheStatsData, EntryCountData, KeyListData,
    KeyValueData, SetKeyData, StoreHealthData, WriteReceiptData,
};
