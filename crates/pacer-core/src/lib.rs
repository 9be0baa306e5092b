#![cfg_attr(not(test), no_std)]

//! Paced guided-reading engine.
//!
//! A [`document::Document`] is indexed once into a flat [`index::WordIndex`],
//! timed by [`timing`], and consumed chunk by chunk by the
//! [`playback::PlaybackController`]. Rendering stays behind the
//! [`visual::VisualLayer`] trait and time is passed in as milliseconds, so the
//! engine runs the same on a terminal host or under tests.

extern crate alloc;

pub mod content;
pub mod document;
pub mod gesture;
pub mod index;
pub mod playback;
pub mod settings;
pub mod text_policy;
pub mod timing;
pub mod visual;
