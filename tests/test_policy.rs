use std::cell::RefCell;
use std::rc::Rc;

use sugars::{rc, refcell};

use vm_placement::core::candidate_orderings::minimum_pes::MinimumPes;
use vm_placement::core::common::{AllocationVerdict, RegistryError};
use vm_placement::core::host::Pe;
use vm_placement::core::logger::{FileLogger, StdoutLogger};
use vm_placement::core::placement_policy::{PlacementError, PlacementPolicy};
use vm_placement::core::resource_pool::HostPool;
use vm_placement::core::vm::{VmSpec, VmUid};

fn make_pes(count: u32) -> Vec<Pe> {
    (0..count).map(|id| Pe::new(id, 1000)).collect()
}

// Host 0: 4 PEs, host 1: 2 PEs, both 16384MB RAM / 10000 bw / 1000000 storage.
fn two_host_pool() -> HostPool {
    let mut pool = HostPool::new();
    pool.add_host(0, make_pes(4), 16384, 10000, 1_000_000).unwrap();
    pool.add_host(1, make_pes(2), 16384, 10000, 1_000_000).unwrap();
    pool
}

fn small_vm(id: u32) -> VmSpec {
    VmSpec::new(id, 1, 1, 512, 1000, 10000)
}

fn make_policy(pool: HostPool) -> PlacementPolicy {
    let _ = env_logger::builder().is_test(true).try_init();
    let logger: Rc<RefCell<StdoutLogger>> = rc!(refcell!(StdoutLogger::new()));
    PlacementPolicy::new(0, pool, Box::new(MinimumPes::new()), logger)
}

fn check_conservation(pool: &HostPool) {
    for host_id in pool.host_ids() {
        let host = pool.host(host_id).unwrap();
        let pes: u32 = host.resident_vms.values().map(|vm| vm.pes).sum();
        let ram: u64 = host.resident_vms.values().map(|vm| vm.ram).sum();
        let bw: u64 = host.resident_vms.values().map(|vm| vm.bandwidth).sum();
        let storage: u64 = host.resident_vms.values().map(|vm| vm.storage).sum();
        assert_eq!(host.pes_free + pes, host.pe_count());
        assert_eq!(host.ram_free + ram, host.ram_total);
        assert_eq!(host.bandwidth_free + bw, host.bandwidth_total);
        assert_eq!(host.storage_free + storage, host.storage_total);
    }
}

#[test]
// Minimum-PE-first fills the 2-PE host before touching the 4-PE one.
fn test_smaller_host_preferred() {
    let mut policy = make_policy(two_host_pool());

    let mut placements = Vec::new();
    for i in 0..5 {
        placements.push(policy.allocate(&small_vm(i), i as f64).unwrap());
    }
    assert_eq!(placements, vec![1, 1, 0, 0, 0]);
    assert_eq!(policy.pool().free_pes(1), 0);
    assert_eq!(policy.pool().free_pes(0), 1);
    check_conservation(policy.pool());
}

#[test]
// A full host rejects the second VM until the first one is released.
fn test_full_host_rejects_until_release() {
    let mut pool = HostPool::new();
    pool.add_host(0, make_pes(1), 1024, 1000, 10000).unwrap();
    let mut policy = make_policy(pool);

    let vm1 = VmSpec::new(1, 1, 1, 512, 500, 5000);
    let vm2 = VmSpec::new(2, 1, 1, 512, 500, 5000);

    assert_eq!(policy.allocate(&vm1, 0.).unwrap(), 0);
    assert!(matches!(
        policy.allocate(&vm2, 1.),
        Err(PlacementError::NoHostAvailable { .. })
    ));

    policy.deallocate(&vm1, 2.).unwrap();
    assert_eq!(policy.allocate(&vm2, 3.).unwrap(), 0);
}

#[test]
fn test_locate() {
    let mut policy = make_policy(two_host_pool());
    let vm = small_vm(1);

    assert_eq!(policy.locate(vm.uid()), None);
    let host_id = policy.allocate(&vm, 0.).unwrap();
    assert_eq!(policy.locate(vm.uid()), Some(host_id));
    policy.deallocate(&vm, 1.).unwrap();
    assert_eq!(policy.locate(vm.uid()), None);
}

#[test]
// Re-allocating a placed VM returns the same host and decrements nothing.
fn test_idempotent_allocate() {
    let mut policy = make_policy(two_host_pool());
    let vm = small_vm(1);

    let first = policy.allocate(&vm, 0.).unwrap();
    let free_pes = policy.pool().free_pes(first);
    let free_ram = policy.pool().free_ram(first);

    let second = policy.allocate(&vm, 1.).unwrap();
    assert_eq!(first, second);
    assert_eq!(policy.pool().free_pes(first), free_pes);
    assert_eq!(policy.pool().free_ram(first), free_ram);
    assert_eq!(policy.placed_vm_count(), 1);
}

#[test]
// Deallocating a VM that was never placed is a no-op.
fn test_idempotent_deallocate() {
    let mut policy = make_policy(two_host_pool());
    let vm = small_vm(1);

    policy.deallocate(&vm, 0.).unwrap();
    assert_eq!(policy.pool().free_pes(0), 4);
    assert_eq!(policy.pool().free_pes(1), 2);

    policy.allocate(&vm, 1.).unwrap();
    policy.deallocate(&vm, 2.).unwrap();
    policy.deallocate(&vm, 3.).unwrap();
    check_conservation(policy.pool());
}

#[test]
// Allocate followed by deallocate returns every counter to its prior value.
fn test_round_trip_restores_counters() {
    let mut policy = make_policy(two_host_pool());
    let vm = VmSpec::new(1, 1, 2, 2048, 3000, 50000);

    let before: Vec<_> = policy
        .pool()
        .host_ids()
        .iter()
        .map(|&h| {
            (
                policy.pool().free_pes(h),
                policy.pool().free_ram(h),
                policy.pool().free_bandwidth(h),
                policy.pool().free_storage(h),
            )
        })
        .collect();

    policy.allocate(&vm, 0.).unwrap();
    policy.deallocate(&vm, 1.).unwrap();

    let after: Vec<_> = policy
        .pool()
        .host_ids()
        .iter()
        .map(|&h| {
            (
                policy.pool().free_pes(h),
                policy.pool().free_ram(h),
                policy.pool().free_bandwidth(h),
                policy.pool().free_storage(h),
            )
        })
        .collect();
    assert_eq!(before, after);
}

#[test]
// Conservation holds at every step and the pool never over-commits.
fn test_no_overcommit() {
    let mut policy = make_policy(two_host_pool());

    let mut placed = 0;
    for i in 0..10 {
        match policy.allocate(&small_vm(i), i as f64) {
            Ok(_) => placed += 1,
            Err(PlacementError::NoHostAvailable { .. }) => {}
            Err(err) => panic!("unexpected error: {}", err),
        }
        check_conservation(policy.pool());
    }
    // 6 PEs total, 1 PE per VM.
    assert_eq!(placed, 6);
    assert_eq!(policy.pool().free_pes(0), 0);
    assert_eq!(policy.pool().free_pes(1), 0);
}

#[test]
// Two independent runs over identical pools choose the same host.
fn test_deterministic_choice() {
    let vm = small_vm(1);
    let mut policy1 = make_policy(two_host_pool());
    let mut policy2 = make_policy(two_host_pool());
    assert_eq!(policy1.allocate(&vm, 0.).unwrap(), policy2.allocate(&vm, 0.).unwrap());
}

#[test]
// Commit without a passing fitness check is rejected without mutation.
fn test_defensive_commit() {
    let mut pool = HostPool::new();
    pool.add_host(0, make_pes(1), 1024, 1000, 10000).unwrap();

    let vm1 = VmSpec::new(1, 1, 1, 512, 500, 5000);
    let vm2 = VmSpec::new(2, 1, 1, 512, 500, 5000);
    pool.commit(0, &vm1).unwrap();

    let err = pool.commit(0, &vm2).unwrap_err();
    assert!(matches!(
        err,
        RegistryError::ResourceExhausted {
            verdict: AllocationVerdict::NotEnoughPes,
            ..
        }
    ));
    assert_eq!(pool.free_ram(0), 512);
    assert_eq!(pool.free_pes(0), 0);
}

#[test]
fn test_release_of_non_resident_vm() {
    let mut pool = HostPool::new();
    pool.add_host(0, make_pes(2), 1024, 1000, 10000).unwrap();

    let vm = VmSpec::new(1, 1, 1, 512, 500, 5000);
    let err = pool.release(0, &vm).unwrap_err();
    assert!(matches!(err, RegistryError::NotResident { .. }));

    pool.commit(0, &vm).unwrap();
    pool.release(0, &vm).unwrap();
    assert_eq!(pool.free_pes(0), 2);
}

#[test]
fn test_duplicate_host_rejected() {
    let mut pool = HostPool::new();
    pool.add_host(0, make_pes(2), 1024, 1000, 10000).unwrap();
    let err = pool.add_host(0, make_pes(4), 2048, 2000, 20000).unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateHost { host_id: 0 }));
    assert_eq!(pool.pe_count(0), 2);
}

#[test]
// VM ids are scoped by the owning user, so equal ids of different users coexist.
fn test_user_scoped_vm_ids() {
    let mut policy = make_policy(two_host_pool());

    let vm_user1 = VmSpec::new(1, 1, 1, 512, 1000, 10000);
    let vm_user2 = VmSpec::new(1, 2, 1, 512, 1000, 10000);

    policy.allocate(&vm_user1, 0.).unwrap();
    policy.allocate(&vm_user2, 1.).unwrap();
    assert_eq!(policy.placed_vm_count(), 2);
    assert_eq!(policy.locate(VmUid::new(1, 1)), Some(1));
    assert_eq!(policy.locate(VmUid::new(2, 1)), Some(1));

    policy.deallocate(&vm_user1, 2.).unwrap();
    assert_eq!(policy.locate(VmUid::new(1, 1)), None);
    assert_eq!(policy.locate(VmUid::new(2, 1)), Some(1));
}

#[test]
// The file logger records one entry per allocation outcome.
fn test_placement_events() {
    let logger: Rc<RefCell<FileLogger>> = rc!(refcell!(FileLogger::new()));
    let mut pool = HostPool::new();
    pool.add_host(0, make_pes(1), 1024, 1000, 10000).unwrap();
    let mut policy = PlacementPolicy::new(7, pool, Box::new(MinimumPes::new()), logger.clone());

    let vm1 = VmSpec::new(1, 1, 1, 512, 500, 5000);
    let vm2 = VmSpec::new(2, 1, 1, 512, 500, 5000);
    policy.allocate(&vm1, 0.5).unwrap();
    assert!(policy.allocate(&vm2, 1.5).is_err());

    assert_eq!(logger.borrow().len(), 2);
}
