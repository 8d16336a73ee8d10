//! Test suite for irqspin

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
    mpsc::channel,
};
use std::thread;

use super::*;

/// Simulated IRQ nesting depth. `local_irq_save_and_disable` returns the
/// depth before entry; `local_irq_restore` reinstates it, mirroring a real
/// flags register.
static IRQ_DEPTH: AtomicUsize = AtomicUsize::new(0);

struct TestIrq;

#[crate_interface::impl_interface]
impl IrqIf for TestIrq {
    fn local_irq_save_and_disable() -> usize {
        IRQ_DEPTH.fetch_add(1, Ordering::SeqCst)
    }

    fn local_irq_restore(flags: usize) {
        IRQ_DEPTH.store(flags, Ordering::SeqCst);
    }
}

#[derive(Eq, PartialEq, Debug)]
struct NonCopy(i32);

#[test]
fn smoke() {
    let m = SpinRaw::new(());
    drop(m.lock());
    drop(m.lock());
}

// All IRQ-depth assertions live in this one test; the depth counter is a
// process-wide static and the harness runs tests concurrently.
#[test]
fn irq_state_saved_and_restored() {
    assert_eq!(IRQ_DEPTH.load(Ordering::SeqCst), 0);

    let outer = IrqSave::new();
    assert_eq!(IRQ_DEPTH.load(Ordering::SeqCst), 1);

    {
        let inner = IrqSave::new();
        assert_eq!(IRQ_DEPTH.load(Ordering::SeqCst), 2);
        drop(inner);
    }
    assert_eq!(IRQ_DEPTH.load(Ordering::SeqCst), 1);

    drop(outer);
    assert_eq!(IRQ_DEPTH.load(Ordering::SeqCst), 0);

    // The IrqSave-guarded lock enters and leaves the same critical section.
    let m = SpinIrqSave::new(7);
    {
        let guard = m.lock();
        assert_eq!(*guard, 7);
        assert_eq!(IRQ_DEPTH.load(Ordering::SeqCst), 1);
    }
    assert_eq!(IRQ_DEPTH.load(Ordering::SeqCst), 0);
}

#[test]
fn lock_mutates() {
    let m = SpinRaw::new(NonCopy(10));
    {
        let mut v = m.lock();
        v.0 = 20;
    }
    assert_eq!(m.lock().0, 20);
}

#[test]
fn get_mut_is_direct() {
    let mut m = SpinRaw::new(1);
    *m.get_mut() = 5;
    assert_eq!(*m.lock(), 5);
}

#[test]
fn into_inner_works() {
    let m = SpinRaw::new(NonCopy(10));
    assert_eq!(m.into_inner(), NonCopy(10));
}

#[test]
fn into_inner_drops() {
    struct Foo(Arc<AtomicUsize>);
    impl Drop for Foo {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    let num_drops = Arc::new(AtomicUsize::new(0));
    let m = SpinRaw::new(Foo(num_drops.clone()));
    assert_eq!(num_drops.load(Ordering::SeqCst), 0);

    {
        let _inner = m.into_inner();
        assert_eq!(num_drops.load(Ordering::SeqCst), 0);
    }

    assert_eq!(num_drops.load(Ordering::SeqCst), 1);
}

#[test]
fn nested_locks() {
    let arc = Arc::new(SpinRaw::new(1));
    let arc2 = Arc::new(SpinRaw::new(arc));
    let (tx, rx) = channel();

    let t = thread::spawn(move || {
        let lock = arc2.lock();
        let lock2 = lock.lock();
        assert_eq!(*lock2, 1);
        tx.send(()).unwrap();
    });

    rx.recv().unwrap();
    t.join().unwrap();
}

#[test]
fn unsized_types() {
    let m: &SpinRaw<[i32]> = &SpinRaw::new([1, 2, 3]);
    {
        let mut b = m.lock();
        b[0] = 4;
        b[2] = 5;
    }
    let expected: &[i32] = &[4, 2, 5];
    assert_eq!(&*m.lock(), expected);
}

#[test]
fn debug_output() {
    let m = SpinRaw::new(42);
    let debug_str = format!("{:?}", m);
    assert!(debug_str.contains("42"));
}
