//! # Primitive access routines
//!
//! One routine per privileged operation. Each receives an already validated
//! request, performs exactly one hardware access through the
//! [`Platform`](crate::platform::Platform) seams and reports the number of
//! output bytes produced. Hardware faults come back as
//! [`AccessError::Unsuccessful`](crate::AccessError::Unsuccessful); no routine
//! keeps state between calls.

mod memory;
mod msr;
mod pci;
mod port;

pub use memory::{read_memory, write_memory};
pub use msr::{read_msr, read_pmc, write_msr};
pub use pci::{read_pci_config, write_pci_config};
pub use port::{read_port, write_port};
