//! Process-wide lifecycle. Runs as a single test in its own binary because
//! shutdown is irreversible for the whole process.

use pyproxy::{exports, runtime, BridgeError, ErrorKind, HostValue, RuntimeConfig, RuntimeState};

#[test]
fn test_lifecycle_load_import_shutdown() {
    // Argument validation happens before any foreign interaction.
    let err = exports::import(&HostValue::Number(42.0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Argument);
    assert_eq!(runtime::state(), RuntimeState::Uninitialized);

    assert!(matches!(
        runtime::with_interpreter(|_py| Ok(())),
        Err(BridgeError::NotInitialized)
    ));

    exports::load(RuntimeConfig::default().with_print_foreign_errors(false)).unwrap();
    assert_eq!(runtime::state(), RuntimeState::Running);

    let math = exports::import(&HostValue::from("math")).unwrap();
    let floor = math.get_attribute("floor").unwrap().expect("math.floor");
    let held = floor.call(&[HostValue::Number(2.7)]).unwrap();
    assert_eq!(held.coerce().unwrap().as_number(), Some(2.0));
    let live = runtime::live_handles();
    assert_eq!(live, 3);

    exports::shutdown().unwrap();
    assert_eq!(runtime::state(), RuntimeState::ShutDown);

    // Everything after shutdown is rejected rather than undefined.
    assert!(matches!(math.get_attribute("pi"), Err(BridgeError::ShutDown)));
    assert!(matches!(held.stringify(), Err(BridgeError::ShutDown)));
    assert!(matches!(held.coerce(), Err(BridgeError::ShutDown)));
    assert!(matches!(floor.call(&[]), Err(BridgeError::ShutDown)));
    assert!(matches!(
        math.set_attribute("pi", HostValue::Undefined),
        Err(BridgeError::ShutDown)
    ));
    assert!(matches!(
        exports::import(&HostValue::from("math")),
        Err(BridgeError::ShutDown)
    ));
    assert!(matches!(
        exports::load(RuntimeConfig::default()),
        Err(BridgeError::ShutDown)
    ));
    assert!(matches!(exports::shutdown(), Err(BridgeError::ShutDown)));

    // Dropping surviving proxies must not touch the finalized interpreter.
    drop(held);
    drop(floor);
    drop(math);
    assert_eq!(runtime::live_handles(), 0);
}
