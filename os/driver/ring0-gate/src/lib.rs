//! # Ring-0 Hardware Access Gate
//!
//! Lets unprivileged diagnostic and monitoring tools read (and, where allowed,
//! write) hardware state that is otherwise only reachable from CPL0:
//!
//! * model-specific registers and performance-monitoring counters,
//! * legacy I/O ports,
//! * PCI configuration space,
//! * physical memory ranges.
//!
//! The host hands every request to a [`Dispatcher`], already framed as a
//! control code plus input and output buffers. The dispatcher validates the
//! buffers for that control code, performs exactly one hardware access
//! through the [`Platform`](platform::Platform) seams, and completes the
//! request with a [`Status`] and a byte count. Nothing is retried, nothing
//! is deferred, and a faulting instruction is reported, never escalated.
//!
//! ## Crate layout
//!
//! | Module            | Role                                                   |
//! |-------------------|--------------------------------------------------------|
//! | [`dispatch`]      | request entry point, validate → execute → complete     |
//! | [`validate`]      | per-opcode size, range and capability rules            |
//! | [`access`]        | one primitive routine per privileged operation         |
//! | [`session`]       | open-handle counter with a permanent "locked" state    |
//! | [`platform`]      | hardware traits and the native x86-64 backend          |
//! | [`opcode`], [`wire`], [`status`] | the request/response contract         |
//!
//! ## Features
//!
//! * `native` (default): the x86-64 backend in [`platform::native`].
//! * `physical-memory`: allows physical memory writes and reads outside the
//!   legacy `0xC0000..=0xFFFFF` window.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod access;
pub mod capabilities;
pub mod dispatch;
pub mod opcode;
pub mod physical;
pub mod platform;
pub mod session;
pub mod status;
pub mod validate;
pub mod wire;

pub use capabilities::Capabilities;
pub use dispatch::{Dispatcher, Request};
pub use opcode::Opcode;
pub use session::SessionRegistry;
pub use status::{AccessError, IoStatus, Status};
