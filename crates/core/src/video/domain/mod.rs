pub mod codec_profile;
pub mod frame_transform;
pub mod grayscale;
pub mod image_writer;
pub mod resize;
pub mod video_backend;
pub mod video_reader;
pub mod video_writer;
