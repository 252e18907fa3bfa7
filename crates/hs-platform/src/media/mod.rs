//! Media storage gateway for uploaded property photos and avatars.

pub mod gateway;

pub use gateway::{public_id_from_url, MediaConfig, MediaGateway, StoredAsset};
