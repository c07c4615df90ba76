//! # Dispatcher
//!
//! Single entry point for every request. Each control request moves through
//! three phases and always runs to completion:
//!
//! ```text
//!            ┌──────────┐   Command    ┌─────────┐  bytes   ┌──────────┐
//! request ──►│ validate │ ───────────► │ execute │ ───────► │ complete │──► IoStatus
//!            └────┬─────┘              └────┬────┘          └──────────┘
//!                 │ InvalidParameter        │ Unsuccessful / PCI errors
//!                 └─────────────────────────┴──────────────────► IoStatus (0 bytes)
//! ```
//!
//! Unknown control codes complete with `NotImplemented`. Once the service has
//! been marked as failed to initialize, every open, close and control request
//! completes with `Unsuccessful`.

use crate::access;
use crate::capabilities::Capabilities;
use crate::opcode::Opcode;
use crate::platform::Platform;
use crate::session::SessionRegistry;
use crate::status::{AccessError, IoStatus, Status};
use crate::validate::{Command, validate};
use crate::wire::{QUERY_REPLY_LEN, SERVICE_ID, VERSION};

/// One framed request as handed over by the host.
#[derive(Debug)]
pub enum Request<'a> {
    /// A handle to the service is being opened.
    Open,
    /// A handle to the service is being closed.
    Close,
    /// A control request on an open handle.
    Control {
        code: u32,
        input: &'a [u8],
        output: &'a mut [u8],
    },
}

pub struct Dispatcher<P: Platform> {
    platform: P,
    sessions: SessionRegistry,
    capabilities: Capabilities,
}

impl<P: Platform> Dispatcher<P> {
    /// Creates a dispatcher with the capabilities selected at build time.
    pub const fn new(platform: P) -> Self {
        Self::with_capabilities(platform, Capabilities::BUILD)
    }

    pub const fn with_capabilities(platform: P, capabilities: Capabilities) -> Self {
        Self {
            platform,
            sessions: SessionRegistry::new(),
            capabilities,
        }
    }

    pub const fn platform(&self) -> &P {
        &self.platform
    }

    pub const fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub const fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Records that the service failed to initialize. From now on every
    /// request is refused.
    pub fn initialization_failed(&self) {
        log::warn!("{SERVICE_ID} failed to initialize; refusing all further requests");
        self.sessions.lock();
    }

    pub fn dispatch(&self, request: Request<'_>) -> IoStatus {
        match request {
            Request::Open => IoStatus {
                status: self.open(),
                information: 0,
            },
            Request::Close => IoStatus {
                status: self.close(),
                information: 0,
            },
            Request::Control { code, input, output } => self.device_control(code, input, output),
        }
    }

    pub fn open(&self) -> Status {
        match self.sessions.open() {
            Ok(n) => {
                log::trace!("session opened ({n} open)");
                Status::SUCCESS
            }
            Err(e) => {
                log::debug!("session open refused: {e}");
                Status::UNSUCCESSFUL
            }
        }
    }

    pub fn close(&self) -> Status {
        match self.sessions.close() {
            Ok(n) => {
                log::trace!("session closed ({n} open)");
                Status::SUCCESS
            }
            Err(e) => {
                log::debug!("session close refused: {e}");
                Status::UNSUCCESSFUL
            }
        }
    }

    /// Handles one control request.
    ///
    /// `output` is the caller's output buffer; its length is the declared
    /// output capacity. On failure its contents are unspecified and the
    /// reported byte count is zero.
    pub fn device_control(&self, code: u32, input: &[u8], output: &mut [u8]) -> IoStatus {
        IoStatus::from(self.control(code, input, output))
    }

    fn control(&self, code: u32, input: &[u8], output: &mut [u8]) -> Result<usize, AccessError> {
        if self.sessions.is_locked() {
            return Err(AccessError::Unsuccessful);
        }
        let Some(opcode) = Opcode::from_code(code) else {
            log::debug!("unknown control code {code:#010x}");
            return Err(AccessError::NotImplemented);
        };
        log::trace!("{opcode:?}: {} input / {} output bytes", input.len(), output.len());

        let command = validate(opcode, input, output.len(), self.capabilities)
            .inspect_err(|_| log::debug!("{opcode:?} rejected: {} input / {} output bytes", input.len(), output.len()))?;
        self.execute(command, output)
    }

    fn execute(&self, command: Command<'_>, output: &mut [u8]) -> Result<usize, AccessError> {
        let p = &self.platform;
        match command {
            Command::DriverVersion => reply_u32(VERSION.into_bits(), output),
            Command::RefCount => reply_u32(self.sessions.query(), output),
            Command::ReadMsr { index } => access::read_msr(p, index, output),
            Command::WriteMsr { index, value } => access::write_msr(p, index, value),
            Command::ReadPmc { counter } => access::read_pmc(p, counter, output),
            Command::Halt => {
                log::warn!("halting processor on request");
                p.halt();
                Ok(0)
            }
            Command::ReadPort { port, width, input_len } => access::read_port(p, port, width, input_len, output),
            Command::WritePort { port, value } => access::write_port(p, port, value),
            Command::ReadPciConfig { address, offset, len } => {
                let out = output.get_mut(..len).ok_or(AccessError::InvalidParameter)?;
                access::read_pci_config(p, address, offset, out)
            }
            Command::WritePciConfig { address, offset, data } => access::write_pci_config(p, address, offset, data),
            Command::ReadMemory { range } => access::read_memory(p, range, output),
            Command::WriteMemory { range, data } => access::write_memory(p, range, data),
        }
    }
}

fn reply_u32(value: u32, output: &mut [u8]) -> Result<usize, AccessError> {
    output
        .get_mut(..QUERY_REPLY_LEN)
        .ok_or(AccessError::InvalidParameter)?
        .copy_from_slice(&value.to_le_bytes());
    Ok(QUERY_REPLY_LEN)
}
