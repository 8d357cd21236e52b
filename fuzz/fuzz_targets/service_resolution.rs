#![no_main]

use libfuzzer_sys::fuzz_target;
use servant::{Servant, ServantError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct Config {
    value: u8,
}

struct Service {
    config: Arc<Config>,
}

// Interleaves serves, eager creation and disposal in an input-driven order and
// checks the lifestyle guarantees hold throughout.
fuzz_target!(|data: &[u8]| {
    let builds = Arc::new(AtomicUsize::new(0));
    let counter = builds.clone();
    let value = data.first().copied().unwrap_or_default();

    let servant = Servant::new();
    let singleton = data.get(1).map_or(true, |b| b % 2 == 0);
    let factory = move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Arc::new(Config { value })
    };
    let registered = if singleton {
        servant.add_singleton(factory)
    } else {
        servant.add_transient(factory)
    };
    assert!(registered.is_ok());
    servant
        .add_transient(|config: Arc<Config>| Arc::new(Service { config }))
        .unwrap();

    let mut serves = 0;
    futures::executor::block_on(async {
        for op in data.iter().skip(2) {
            match op % 4 {
                0 | 1 => match servant.serve::<Service>().await {
                    Ok(service) => {
                        serves += 1;
                        assert_eq!(service.config.value, value);
                    }
                    Err(ServantError::Disposed { .. }) => assert!(servant.is_disposed()),
                    Err(other) => panic!("unexpected error: {other}"),
                },
                2 => {
                    if !servant.is_disposed() {
                        servant.create_singletons().await.unwrap();
                    }
                }
                _ => servant.dispose().await,
            }
        }
    });

    let built = builds.load(Ordering::SeqCst);
    if singleton {
        assert!(built <= 1);
    } else {
        assert_eq!(built, serves);
    }
});
