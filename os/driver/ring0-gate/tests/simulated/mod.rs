//! A software stand-in for the hardware behind the gate.

#![allow(dead_code)]

use ring0_gate::physical::PhysicalAddress;
use ring0_gate::platform::{Fault, IoSpaceMapper, ModelSpecificRegisters, PciConfigSpace, PciSlot, PortIo, Processor};
use ring0_gate::wire::{PortValue, PortWidth};
use ring0_registers::{Msr, Pmc};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ptr::NonNull;

/// Size of the simulated physical address space.
pub const MEMORY_LEN: usize = 1 << 20;

pub const CONFIG_SPACE_LEN: usize = 256;

pub struct SimulatedPlatform {
    /// Implemented MSRs; any other index faults.
    pub msrs: RefCell<HashMap<u32, u64>>,
    /// Implemented counters; any other selector faults.
    pub pmcs: RefCell<HashMap<u32, u64>>,
    pub ports: RefCell<HashMap<u16, u32>>,
    /// Buses `0..buses` exist.
    pub buses: u16,
    pub devices: RefCell<HashMap<(u8, u8, u8), [u8; CONFIG_SPACE_LEN]>>,
    /// Length of every PCI configuration write forwarded to the accessor.
    pub pci_writes: RefCell<Vec<usize>>,
    memory: Box<[Cell<u8>]>,
    pub refuse_mappings: Cell<bool>,
    pub live_mappings: Cell<isize>,
    pub mappings: Cell<usize>,
    pub halts: Cell<usize>,
    /// Number of hardware primitives invoked, of any kind.
    pub calls: Cell<usize>,
}

impl Default for SimulatedPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedPlatform {
    pub fn new() -> Self {
        Self {
            msrs: RefCell::new(HashMap::from([
                (Msr::IA32_TIME_STAMP_COUNTER.raw(), 0x1234_5678_9ABC_DEF0),
                (Msr::IA32_THERM_STATUS.raw(), 0x8843_0000),
            ])),
            pmcs: RefCell::new(HashMap::from([(0, 42), (Pmc::FIXED_FUNCTION, 7)])),
            ports: RefCell::new(HashMap::new()),
            buses: 2,
            devices: RefCell::new(HashMap::new()),
            pci_writes: RefCell::new(Vec::new()),
            memory: (0..MEMORY_LEN).map(|_| Cell::new(0)).collect(),
            refuse_mappings: Cell::new(false),
            live_mappings: Cell::new(0),
            mappings: Cell::new(0),
            halts: Cell::new(0),
            calls: Cell::new(0),
        }
    }

    /// Adds a device whose configuration space starts with the given vendor
    /// and device IDs.
    pub fn with_device(self, bus: u8, device: u8, function: u8, vendor: u16, id: u16) -> Self {
        let mut space = [0u8; CONFIG_SPACE_LEN];
        space[0..2].copy_from_slice(&vendor.to_le_bytes());
        space[2..4].copy_from_slice(&id.to_le_bytes());
        self.devices.borrow_mut().insert((bus, device, function), space);
        self
    }

    pub fn poke(&self, address: usize, bytes: &[u8]) {
        for (cell, &b) in self.memory[address..address + bytes.len()].iter().zip(bytes) {
            cell.set(b);
        }
    }

    pub fn peek(&self, address: usize, len: usize) -> Vec<u8> {
        self.memory[address..address + len].iter().map(Cell::get).collect()
    }

    fn tick(&self) {
        self.calls.set(self.calls.get() + 1);
    }
}

impl ModelSpecificRegisters for SimulatedPlatform {
    fn read_msr(&self, index: u32) -> Result<u64, Fault> {
        self.tick();
        self.msrs.borrow().get(&index).copied().ok_or(Fault)
    }

    fn write_msr(&self, index: u32, value: u64) -> Result<(), Fault> {
        self.tick();
        let mut msrs = self.msrs.borrow_mut();
        let slot = msrs.get_mut(&index).ok_or(Fault)?;
        *slot = value;
        Ok(())
    }

    fn read_pmc(&self, counter: u32) -> Result<u64, Fault> {
        self.tick();
        self.pmcs.borrow().get(&counter).copied().ok_or(Fault)
    }
}

impl PortIo for SimulatedPlatform {
    fn read_port(&self, port: u16, width: PortWidth) -> PortValue {
        self.tick();
        let raw = self.ports.borrow().get(&port).copied().unwrap_or(u32::MAX);
        PortValue::truncate(width, raw)
    }

    fn write_port(&self, port: u16, value: PortValue) {
        self.tick();
        self.ports.borrow_mut().insert(port, value.widened());
    }
}

impl PciConfigSpace for SimulatedPlatform {
    fn read_config(&self, slot: PciSlot, offset: u32, buf: &mut [u8]) -> usize {
        self.tick();
        if u16::from(slot.bus) >= self.buses {
            return 0;
        }
        let devices = self.devices.borrow();
        let Some(space) = devices.get(&(slot.bus, slot.device, slot.function)) else {
            for b in buf.iter_mut().take(2) {
                *b = 0xFF;
            }
            return 2;
        };
        let start = (offset as usize).min(CONFIG_SPACE_LEN);
        let n = buf.len().min(CONFIG_SPACE_LEN - start);
        buf[..n].copy_from_slice(&space[start..start + n]);
        n
    }

    fn write_config(&self, slot: PciSlot, offset: u32, data: &[u8]) -> usize {
        self.tick();
        self.pci_writes.borrow_mut().push(data.len());
        if u16::from(slot.bus) >= self.buses {
            return 0;
        }
        let mut devices = self.devices.borrow_mut();
        let Some(space) = devices.get_mut(&(slot.bus, slot.device, slot.function)) else {
            return 0;
        };
        let start = (offset as usize).min(CONFIG_SPACE_LEN);
        let n = data.len().min(CONFIG_SPACE_LEN - start);
        space[start..start + n].copy_from_slice(&data[..n]);
        n
    }
}

impl IoSpaceMapper for SimulatedPlatform {
    unsafe fn map_io_space(&self, base: PhysicalAddress, len: usize) -> Option<NonNull<u8>> {
        self.tick();
        if self.refuse_mappings.get() {
            return None;
        }
        let start = usize::try_from(base.as_u64()).ok()?;
        if start.checked_add(len)? > MEMORY_LEN {
            return None;
        }
        self.mappings.set(self.mappings.get() + 1);
        self.live_mappings.set(self.live_mappings.get() + 1);
        // Cell<u8> has the layout of u8 and permits writes through a shared borrow.
        let base = self.memory.as_ptr().cast::<u8>().cast_mut();
        NonNull::new(unsafe { base.add(start) })
    }

    unsafe fn unmap_io_space(&self, _mapped: NonNull<u8>, _len: usize) {
        self.live_mappings.set(self.live_mappings.get() - 1);
    }
}

impl Processor for SimulatedPlatform {
    fn halt(&self) {
        self.tick();
        self.halts.set(self.halts.get() + 1);
    }
}
