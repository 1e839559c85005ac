pub mod constants;
pub mod error;
pub mod frame;
pub mod stream_properties;
pub mod variant_artifact;
