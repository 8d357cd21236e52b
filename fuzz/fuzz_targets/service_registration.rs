#![no_main]

use futures::FutureExt;
use libfuzzer_sys::fuzz_target;
use servant::{FactoryFuture, Instance, Lifestyle, Servant, ServantError, TypeKey};
use std::sync::Arc;

struct Node<const N: usize>;

fn make<const N: usize>(_args: Vec<Instance>) -> FactoryFuture {
    async { Ok(Some(Instance::new(Arc::new(Node::<N>)))) }.boxed()
}

type Maker = fn(Vec<Instance>) -> FactoryFuture;

fn node<const N: usize>() -> (TypeKey, Maker) {
    (TypeKey::of::<Node<N>>(), make::<N>)
}

// Each chunk of bytes is one registration attempt: declared node, lifestyle,
// then up to three dependency nodes. Whatever the input, the accepted graph
// must stay acyclic, which means every fully registered node resolves.
fuzz_target!(|data: &[u8]| {
    let table = [
        node::<0>(),
        node::<1>(),
        node::<2>(),
        node::<3>(),
        node::<4>(),
        node::<5>(),
    ];
    let servant = Servant::new();

    for chunk in data.chunks(5) {
        let (declared, factory) = table[chunk[0] as usize % table.len()];
        let lifestyle = if chunk.len() > 1 && chunk[1] % 2 == 0 {
            Lifestyle::Singleton
        } else {
            Lifestyle::Transient
        };
        let deps: Vec<TypeKey> = chunk
            .iter()
            .skip(2)
            .map(|b| table[*b as usize % table.len()].0)
            .collect();

        match servant.add(lifestyle, declared, factory, &deps) {
            Ok(())
            | Err(ServantError::SelfDependency(_))
            | Err(ServantError::DuplicateDependency { .. })
            | Err(ServantError::Cycle { .. })
            | Err(ServantError::AlreadyRegistered(_)) => {}
            Err(other) => panic!("unexpected registration error: {other}"),
        }
    }

    for (key, _) in &table {
        if !servant.is_type_registered(key) {
            continue;
        }
        match futures::executor::block_on(servant.serve_key(key)) {
            Ok(instance) => assert!(instance.is_instance_of(key)),
            Err(ServantError::UnregisteredDependency { .. }) => {}
            Err(other) => panic!("unexpected resolution error: {other}"),
        }
    }
});
