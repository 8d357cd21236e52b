use futures::FutureExt;
use servant::{Instance, Lifestyle, Servant, ServantError, TypeKey};
use std::sync::Arc;

struct A;
struct B;
struct C;
struct D;

fn leaf_factory(_args: Vec<Instance>) -> servant::FactoryFuture {
    async { Ok(Some(Instance::new(Arc::new(0u8)))) }.boxed()
}

fn add_erased(servant: &Servant, declared: TypeKey, deps: &[TypeKey]) -> Result<(), ServantError> {
    servant.add(Lifestyle::Transient, declared, leaf_factory, deps)
}

#[test]
fn test_self_dependency_rejected() {
    let servant = Servant::new();

    let err = servant.add_singleton(|_a: Arc<A>| Arc::new(A)).unwrap_err();
    assert!(matches!(err, ServantError::SelfDependency(name) if name.ends_with("::A")));
    assert!(err.to_string().contains("depends upon its own type"));

    let err = servant
        .add_transient(|_b: Arc<B>, _a: Arc<A>, _c: Arc<C>| Arc::new(A))
        .unwrap_err();
    assert!(matches!(err, ServantError::SelfDependency(_)));

    assert!(!servant.is_registered::<A>());
}

#[test]
fn test_duplicate_dependency_rejected() {
    let servant = Servant::new();
    let err = servant
        .add_singleton(|_b: Arc<B>, _c: Arc<C>, _b2: Arc<B>| Arc::new(A))
        .unwrap_err();

    match &err {
        ServantError::DuplicateDependency { declared, dependency } => {
            assert!(declared.ends_with("::A"));
            assert!(dependency.ends_with("::B"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.is_configuration());
}

#[test]
fn test_self_dependency_checked_before_duplicates() {
    let servant = Servant::new();
    let err = servant
        .add_singleton(|_a: Arc<A>, _b: Arc<B>, _b2: Arc<B>| Arc::new(A))
        .unwrap_err();
    assert!(matches!(err, ServantError::SelfDependency(_)));
}

#[test]
fn test_already_registered() {
    let servant = Servant::new();
    servant.add_singleton(|| Arc::new(A)).unwrap();

    let err = servant.add_transient(|| Arc::new(A)).unwrap_err();
    assert!(matches!(err, ServantError::AlreadyRegistered(_)));
    assert_eq!(err.to_string(), format!("Type \"{}\" already registered.", std::any::type_name::<A>()));
}

#[test]
fn test_registering_placeholder_type_fills_it() {
    let servant = Servant::new();
    servant.add_singleton(|_b: Arc<B>| Arc::new(A)).unwrap();
    assert!(!servant.is_registered::<B>());

    servant.add_singleton(|| Arc::new(B)).unwrap();
    assert!(servant.is_registered::<B>());
}

#[test]
fn test_direct_cycle_rejected() {
    let servant = Servant::new();
    servant.add_singleton(|_b: Arc<B>| Arc::new(A)).unwrap();

    let err = servant.add_singleton(|_a: Arc<A>| Arc::new(B)).unwrap_err();
    match &err {
        ServantError::Cycle { declared, dependency } => {
            assert!(declared.ends_with("::B"));
            assert!(dependency.ends_with("::A"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("would create circular dependencies"));
    assert!(!servant.is_registered::<B>());
}

#[test]
fn test_transitive_cycle_rejected_without_partial_state() {
    let servant = Servant::new();
    add_erased(&servant, TypeKey::of::<A>(), &[TypeKey::of::<B>()]).unwrap();
    add_erased(&servant, TypeKey::of::<B>(), &[TypeKey::of::<C>()]).unwrap();

    let err = add_erased(&servant, TypeKey::of::<C>(), &[TypeKey::of::<D>(), TypeKey::of::<A>()]).unwrap_err();
    assert!(matches!(err, ServantError::Cycle { .. }));

    // D was never mentioned by a successful registration.
    let debug = format!("{:?}", servant);
    assert!(!debug.contains("::D"));
    assert!(!servant.is_registered::<C>());

    // C can still be registered without the offending edge.
    add_erased(&servant, TypeKey::of::<C>(), &[TypeKey::of::<D>()]).unwrap();
    assert!(servant.is_registered::<C>());
}

#[test]
fn test_cycle_checked_before_already_registered() {
    let servant = Servant::new();
    add_erased(&servant, TypeKey::of::<A>(), &[TypeKey::of::<B>()]).unwrap();
    add_erased(&servant, TypeKey::of::<B>(), &[]).unwrap();

    let err = add_erased(&servant, TypeKey::of::<B>(), &[TypeKey::of::<A>()]).unwrap_err();
    assert!(matches!(err, ServantError::Cycle { .. }));
}

#[test]
fn test_diamond_is_not_a_cycle() {
    let servant = Servant::new();
    add_erased(&servant, TypeKey::of::<D>(), &[]).unwrap();
    add_erased(&servant, TypeKey::of::<B>(), &[TypeKey::of::<D>()]).unwrap();
    add_erased(&servant, TypeKey::of::<C>(), &[TypeKey::of::<D>()]).unwrap();
    add_erased(&servant, TypeKey::of::<A>(), &[TypeKey::of::<B>(), TypeKey::of::<C>()]).unwrap();

    assert_eq!(servant.registered_types().len(), 4);
}

#[test]
fn test_registration_after_dispose_fails() {
    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
    let servant = Servant::new();
    runtime.block_on(servant.dispose());

    let err = servant.add_singleton(|| Arc::new(A)).unwrap_err();
    assert!(matches!(err, ServantError::Disposed { .. }));
    assert!(matches!(
        servant.declare_assignable::<A, B>(),
        Err(ServantError::Disposed { .. })
    ));
}

#[test]
fn test_lifestyle_parsing() {
    assert_eq!("Transient".parse::<Lifestyle>().unwrap(), Lifestyle::Transient);
    assert_eq!(Lifestyle::try_from("SINGLETON").unwrap(), Lifestyle::Singleton);

    let err = "Scoped".parse::<Lifestyle>().unwrap_err();
    assert!(matches!(err, ServantError::InvalidLifestyle(ref raw) if raw == "Scoped"));
    assert!(err.is_configuration());
}

#[tokio::test]
async fn test_concurrent_registration_of_same_type() {
    let servant = Servant::new();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let servant = servant.clone();
            tokio::spawn(async move { servant.add_singleton(move || Arc::new(i as u32)) })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => successes += 1,
            Err(err) => assert!(matches!(err, ServantError::AlreadyRegistered(_))),
        }
    }
    assert_eq!(successes, 1);
}
