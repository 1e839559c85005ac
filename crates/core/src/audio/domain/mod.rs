pub mod audio_buffer;
pub mod audio_reader;
pub mod audio_transformer;
pub mod audio_writer;
pub mod decimation;
pub mod quantization;
