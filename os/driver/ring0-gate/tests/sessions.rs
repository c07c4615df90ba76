mod simulated;

use ring0_gate::session::SessionRegistry;
use ring0_gate::{Dispatcher, Opcode, Request, Status};
use simulated::SimulatedPlatform;

fn refcount(gate: &Dispatcher<SimulatedPlatform>) -> u32 {
    let mut out = [0u8; 4];
    let s = gate.device_control(Opcode::GetRefCount.code(), &[], &mut out);
    assert_eq!(s.status, Status::SUCCESS);
    u32::from_le_bytes(out)
}

#[test]
fn opens_and_closes_balance() {
    let gate = Dispatcher::new(SimulatedPlatform::new());
    for n in 1..=5 {
        assert_eq!(gate.open(), Status::SUCCESS);
        assert_eq!(refcount(&gate), n);
    }
    for n in (0..5).rev() {
        assert_eq!(gate.close(), Status::SUCCESS);
        assert_eq!(refcount(&gate), n);
    }
}

#[test]
fn close_without_open_keeps_zero() {
    let gate = Dispatcher::new(SimulatedPlatform::new());
    assert_eq!(gate.dispatch(Request::Close).status, Status::SUCCESS);
    assert_eq!(gate.sessions().query(), 0);
}

#[test]
fn failed_initialization_locks_the_registry() {
    let gate = Dispatcher::new(SimulatedPlatform::new());
    assert_eq!(gate.open(), Status::SUCCESS);
    gate.initialization_failed();

    assert_eq!(gate.open(), Status::UNSUCCESSFUL);
    assert_eq!(gate.close(), Status::UNSUCCESSFUL);
    assert_eq!(gate.dispatch(Request::Open).status, Status::UNSUCCESSFUL);
    assert_eq!(gate.sessions().query(), SessionRegistry::LOCKED);
    assert!(gate.sessions().is_locked());
}
