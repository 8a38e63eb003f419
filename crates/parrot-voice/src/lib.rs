//! Speech synthesis core for the Parrot proxy.
//!
//! Turns a validated [`SynthesisRequest`](parrot_types::SynthesisRequest)
//! into audio bytes. The [`SpeechPipeline`] keys each request by content,
//! serves from the on-disk [`DiskCache`] when it can, calls the remote
//! provider through a retrying [`SynthesisClient`] when it cannot, and
//! transcodes to the telephony format with an [`FfmpegConverter`], falling
//! back to the provider's format when transcoding fails.
//!
//! Each collaborator sits behind a trait ([`AudioCache`], [`SpeechProvider`],
//! [`AudioConverter`]) so the pipeline can be driven with in-memory doubles.

pub mod cache;
pub mod config;
pub mod convert;
pub mod error;
pub mod key;
pub mod pipeline;
pub mod provider;
pub mod synth;

pub use cache::{AudioCache, DiskCache};
pub use config::{ConverterConfig, ProviderConfig};
pub use convert::{AudioConverter, FfmpegConverter};
pub use error::{CacheError, ConversionError, PipelineError, SynthesisError};
pub use key::{cache_key, CacheKey};
pub use pipeline::{CacheStatus, SpeechOutput, SpeechPipeline};
pub use provider::ElevenLabsProvider;
pub use synth::{RetryPolicy, SpeechProvider, SynthesisClient};
