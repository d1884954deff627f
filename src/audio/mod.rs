//! Audio ingestion: frame types, format conversion, and the outbound queue.

pub mod converter;
pub mod frame;
pub mod queue;
pub mod resampler;
pub mod wav;

pub use converter::{ConverterConfig, FrameConverter};
pub use frame::{AudioFrame, PcmChunk};
pub use queue::ChunkQueue;
pub use resampler::LinearResampler;
pub use wav::WavFrameSource;
