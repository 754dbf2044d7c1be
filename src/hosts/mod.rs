//! Host implementations
//!
//! - `mem`: always-available in-memory host over snapshot documents; doubles
//!   as the test rig (staleness, recorded side effects, virtual scheduler).
//! - `android`: live-runtime host over JNI, compiled only with the
//!   `android-host` feature.

pub mod mem;

#[cfg(feature = "android-host")]
pub mod android;
