//! Discrete hardware around the codec: headphone volume stepper, input gain
//! stages, true-bypass relays and expression pedal routing.
//!
//! These are plain digital lines driven open loop by [`DiscreteEngine`].
//! Pedal flag interrupts reach the engine through the queue in [`event`].

pub mod engine;
pub mod event;
pub mod lines;

pub use engine::{AuxiliaryState, Channel, DiscreteCaps, DiscreteEngine, PedalSignal};
pub use event::{raise_flag, PedalConsumer, PedalEvent, PedalProducer, PedalQueue};
pub use lines::{bypass_level, DiscreteLines, GAIN_STAGE_CODES};
