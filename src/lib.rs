//! Screen-space bloom post-processing.
//!
//! Given a rendered HDR color buffer, the pipeline extracts bright regions
//! above a perceptual threshold (with a continuous soft knee), blurs them
//! progressively across a chain of shrinking scratch buffers, and
//! recombines them additively into a soft multi-scale glow that the host
//! composites back over the original image.
//!
//! ```rust,ignore
//! use afterglow::prelude::*;
//!
//! let mut host = EffectHost::new(BloomSettings::default(), HostConfig::default());
//! host.initialize();
//! let bloom = host.render_frame(&scene_hdr);
//! let frame = host.composite(&scene_hdr, &DisplayParams::default());
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod blur;
pub mod buffer;
pub mod errors;
pub mod host;
pub mod pipeline;
pub mod pool;
pub mod pyramid;
pub mod settings;
pub mod threshold;

pub use buffer::{AddressMode, ColorBuffer, FilterMode};
pub use errors::{BloomError, Result};
pub use host::EffectHost;
pub use pipeline::BloomPipeline;
pub use pool::BufferPool;
pub use pyramid::{PyramidPlan, Resolution};
pub use settings::{BloomSettings, DisplayParams, HostConfig, ToneMapping};
pub use threshold::ThresholdFilter;

/// Commonly used types, for glob import.
pub mod prelude {
    pub use crate::buffer::ColorBuffer;
    pub use crate::host::EffectHost;
    pub use crate::pipeline::BloomPipeline;
    pub use crate::pyramid::{PyramidPlan, Resolution};
    pub use crate::settings::{BloomSettings, DisplayParams, HostConfig, ToneMapping};
}
