pub mod ffmpeg_backend;
pub mod ffmpeg_reader;
pub mod ffmpeg_writer;
pub mod image_file_writer;
