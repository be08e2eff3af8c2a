#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Pedal-assist core (hardware-agnostic).
//!
//! Turns quadrature pulses from a pedal sensor into a signed cadence and
//! arbitrates a bounded, ramp-limited motor-current fraction from it. All
//! hardware goes through `pas_traits::{PedalPins, CurrentSink, Clock}`.
//!
//! ## Architecture
//!
//! - **Decoding**: 16-entry quadrature transition table (`quadrature` module)
//! - **Filtering**: single-pole low-pass of the per-revolution period (`cadence`)
//! - **Inactivity**: fixed-step timeout forcing cadence to zero (`inactivity`)
//! - **Sampling path**: the three above behind `CadenceSensor::sample` (`sensor`)
//! - **Arbitration**: safe-start, assist curve, ramp limiting (`arbiter`)
//! - **Boundary**: `PasApp` configure/start/stop and the supervisory thread (`app`)
//!
//! The two execution contexts share only atomics (`shared`); there are no
//! locks between the sampling path and the supervisory loop.

pub mod app;
pub mod arbiter;
pub mod cadence;
pub mod config;
pub mod conversions;
pub mod error;
pub mod inactivity;
pub mod mocks;
pub mod quadrature;
pub mod sampler;
pub mod sensor;
pub mod shared;
pub mod status;
pub mod util;

pub use app::{PasApp, PasHandle};
pub use arbiter::Arbiter;
pub use config::{AssistCurve, OutputMode, PasConfig, Thresholds};
pub use error::{PasError, Result};
pub use sampler::PedalSampler;
pub use sensor::CadenceSensor;
pub use status::ArbiterState;
