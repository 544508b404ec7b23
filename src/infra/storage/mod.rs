pub mod local_blob_store;
pub mod http_blob_store;
