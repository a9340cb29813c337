// Copyright (c) 2017-2021 Fabian Schuiki

//! Timing diagrams from simulation runs. This library samples the signals of
//! a running (or recorded) hardware simulation once per clock cycle and
//! records them as a WaveDrom description, ready to be rendered.
//!
//! ```
//! use wavetap::{Edge, SharedSignal, SignalOptions, Waveform, WaveformConfig};
//!
//! let clk = SharedSignal::new("clk", 1);
//! let data = SharedSignal::new("data", 8);
//! let mut wave = Waveform::new(clk.clone(), WaveformConfig::new("demo")).unwrap();
//! wave.add_signal(data.clone(), SignalOptions::data()).unwrap();
//!
//! for v in &[0x0a, 0x0a, 0x0b] {
//!     data.set_usize(*v);
//!     wave.on_edge(Edge::Rising);
//!     wave.on_edge(Edge::Falling);
//! }
//! let trace = wave.stop();
//! assert_eq!(trace.find("data[7:0]").unwrap().wave(), "3.3");
//! ```

#[macro_use]
extern crate log;

pub mod encoder;
mod error;
pub mod export;
pub mod probe;
pub mod replay;
pub mod sampler;
pub mod signal;
pub mod trace;
pub mod value;
mod waveform;

pub use crate::{
    error::{Error, Result},
    probe::{Probe, ProbeRef, SharedSignal},
    replay::VcdReplay,
    sampler::{Scheduler, StopHandle},
    signal::{Edge, SignalOptions},
    trace::Trace,
    value::LogicValue,
    waveform::{Waveform, WaveformConfig},
};
