//! Lifecycle tests for the process-wide runtime.
//!
//! The manager is global, so these tests serialize on a file-local mutex and
//! each starts from a clean (finalized) state.

use matprof_runtime as matprof;

use matprof::{MatprofError, StubBackend};
use parking_lot::Mutex;

static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> parking_lot::MutexGuard<'static, ()> {
    let guard = SERIAL.lock();
    // A previous test may have left the engine up after a panic.
    let _ = matprof::finalize();
    guard
}

#[test]
fn test_initialize_finalize_cycle() {
    let _guard = serial();

    matprof::initialize().unwrap();
    assert!(matprof::device_count().unwrap() >= 1);
    assert!(matprof::stream_count().unwrap() >= 1);
    assert_eq!(matprof::current_device().unwrap(), 0);
    matprof::finalize().unwrap();
}

#[test]
fn test_double_initialize_rejected() {
    let _guard = serial();

    matprof::initialize().unwrap();
    assert_eq!(
        matprof::initialize().unwrap_err(),
        MatprofError::AlreadyInitialized
    );
    // The first initialization is still live.
    assert!(matprof::device_count().is_ok());
    matprof::finalize().unwrap();
}

#[test]
fn test_not_initialized_errors() {
    let _guard = serial();

    assert_eq!(matprof::finalize().unwrap_err(), MatprofError::NotInitialized);
    assert_eq!(
        matprof::device_count().unwrap_err(),
        MatprofError::NotInitialized
    );
    assert_eq!(
        matprof::stream_count().unwrap_err(),
        MatprofError::NotInitialized
    );
    assert_eq!(
        matprof::use_device(0).unwrap_err(),
        MatprofError::NotInitialized
    );
    assert_eq!(
        matprof::current_device().unwrap_err(),
        MatprofError::NotInitialized
    );
    let err = matprof::selfjoin(&[0.0; 16], 4, Default::default()).unwrap_err();
    assert_eq!(err, MatprofError::NotInitialized);
}

#[test]
fn test_reinitialize_after_finalize() {
    let _guard = serial();

    for _ in 0..3 {
        matprof::initialize().unwrap();
        assert!(matprof::device_count().unwrap() >= 1);
        matprof::finalize().unwrap();
    }
}

#[test]
fn test_use_device_bounds() {
    let _guard = serial();

    matprof::initialize_with(&StubBackend::new(2, 1), 0, None).unwrap();
    matprof::use_device(1).unwrap();
    assert_eq!(matprof::current_device().unwrap(), 1);

    assert_eq!(
        matprof::use_device(2).unwrap_err(),
        MatprofError::InvalidDevice { id: 2, count: 2 }
    );
    // A failed bind leaves the previous binding in place.
    assert_eq!(matprof::current_device().unwrap(), 1);
    matprof::finalize().unwrap();
}

#[test]
fn test_binding_resets_after_reinitialize() {
    let _guard = serial();

    matprof::initialize_with(&StubBackend::new(3, 1), 0, None).unwrap();
    matprof::use_device(2).unwrap();
    assert_eq!(matprof::current_device().unwrap(), 2);
    matprof::finalize().unwrap();

    matprof::initialize_with(&StubBackend::new(3, 1), 0, None).unwrap();
    assert_eq!(matprof::current_device().unwrap(), 0);
    matprof::finalize().unwrap();
}

#[test]
fn test_device_range_initialization() {
    let _guard = serial();

    // Two of the four stub devices.
    matprof::initialize_with(&StubBackend::new(4, 2), 1, Some(2)).unwrap();
    assert_eq!(matprof::device_count().unwrap(), 2);
    assert_eq!(matprof::stream_count().unwrap(), 2);
    matprof::finalize().unwrap();

    // Out-of-range selections are rejected and leave the engine down.
    assert!(matches!(
        matprof::initialize_with(&StubBackend::new(4, 2), 2, Some(3)).unwrap_err(),
        MatprofError::InvalidDevice { .. }
    ));
    assert!(matches!(
        matprof::initialize_with(&StubBackend::new(4, 2), 4, None).unwrap_err(),
        MatprofError::InvalidDevice { .. }
    ));
    assert_eq!(
        matprof::device_count().unwrap_err(),
        MatprofError::NotInitialized
    );
}

#[test]
fn test_bindings_are_per_thread() {
    let _guard = serial();

    matprof::initialize_with(&StubBackend::new(2, 1), 0, None).unwrap();
    matprof::use_device(1).unwrap();

    let other = std::thread::spawn(|| matprof::current_device().unwrap())
        .join()
        .unwrap();
    assert_eq!(other, 0);
    assert_eq!(matprof::current_device().unwrap(), 1);
    matprof::finalize().unwrap();
}
