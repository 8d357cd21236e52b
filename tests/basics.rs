use servant::{Construct, Lifestyle, Servant, TypeKey};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[tokio::test]
async fn test_singleton_instance_is_shared() {
    let servant = Servant::new();
    servant.add_singleton_instance(Arc::new(42usize)).unwrap();
    servant.add_singleton_instance(Arc::new("hello".to_string())).unwrap();

    let num1 = servant.serve::<usize>().await.unwrap();
    let num2 = servant.serve::<usize>().await.unwrap();
    let str1 = servant.serve::<String>().await.unwrap();

    assert_eq!(*num1, 42);
    assert_eq!(*str1, "hello");
    assert!(Arc::ptr_eq(&num1, &num2));
}

#[tokio::test]
async fn test_factory_with_dependencies() {
    struct Config {
        port: u16,
    }

    struct Server {
        config: Arc<Config>,
        name: String,
    }

    let servant = Servant::new();
    servant.add_singleton(|| Arc::new(Config { port: 8080 })).unwrap();
    servant
        .add_singleton(|config: Arc<Config>| {
            Arc::new(Server {
                config,
                name: "MyServer".to_string(),
            })
        })
        .unwrap();

    let server = servant.serve::<Server>().await.unwrap();
    assert_eq!(server.config.port, 8080);
    assert_eq!(server.name, "MyServer");
}

#[tokio::test]
async fn test_transient_creates_new_instances() {
    let counter = Arc::new(AtomicUsize::new(0));
    let counter_clone = counter.clone();

    let servant = Servant::new();
    servant
        .add_transient(move || {
            let n = counter_clone.fetch_add(1, Ordering::SeqCst) + 1;
            Arc::new(format!("instance-{}", n))
        })
        .unwrap();

    let a = servant.serve::<String>().await.unwrap();
    let b = servant.serve::<String>().await.unwrap();
    let c = servant.serve::<String>().await.unwrap();

    assert_eq!(*a, "instance-1");
    assert_eq!(*b, "instance-2");
    assert_eq!(*c, "instance-3");
    assert!(!Arc::ptr_eq(&a, &b));
}

#[tokio::test]
async fn test_singleton_dependencies_are_shared_across_transients() {
    struct Pool;
    struct Repository {
        pool: Arc<Pool>,
    }

    let servant = Servant::new();
    servant.add_singleton(|| Arc::new(Pool)).unwrap();
    servant.add_transient(|pool: Arc<Pool>| Arc::new(Repository { pool })).unwrap();

    let r1 = servant.serve::<Repository>().await.unwrap();
    let r2 = servant.serve::<Repository>().await.unwrap();
    assert!(!Arc::ptr_eq(&r1, &r2));
    assert!(Arc::ptr_eq(&r1.pool, &r2.pool));
}

#[tokio::test]
async fn test_async_factory_with_dependencies() {
    struct Settings {
        url: String,
    }
    struct Connection {
        url: String,
    }

    let servant = Servant::new();
    servant
        .add_singleton_async(|| async {
            tokio::task::yield_now().await;
            Arc::new(Settings {
                url: "redis://cache".to_string(),
            })
        })
        .unwrap();
    servant
        .add_transient_async(|settings: Arc<Settings>| async move {
            tokio::task::yield_now().await;
            Ok::<_, std::io::Error>(Arc::new(Connection {
                url: settings.url.clone(),
            }))
        })
        .unwrap();

    let connection = servant.serve::<Connection>().await.unwrap();
    assert_eq!(connection.url, "redis://cache");
}

#[tokio::test]
async fn test_trait_object_declaration() {
    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }
    struct English;
    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }
    struct Frontdesk {
        greeter: Arc<dyn Greeter>,
    }

    let servant = Servant::new();
    servant
        .add_singleton::<dyn Greeter, _, _>(|| Arc::new(English) as Arc<dyn Greeter>)
        .unwrap();
    servant
        .add_transient(|greeter: Arc<dyn Greeter>| Arc::new(Frontdesk { greeter }))
        .unwrap();

    let desk = servant.serve::<Frontdesk>().await.unwrap();
    assert_eq!(desk.greeter.greet(), "hello");
    assert!(servant.is_registered::<dyn Greeter>());
    assert!(!servant.is_registered::<English>());
}

#[tokio::test]
async fn test_many_dependencies() {
    struct A;
    struct B;
    struct C;
    struct D;
    struct Aggregate {
        parts: usize,
    }

    let servant = Servant::new();
    servant.add_singleton(|| Arc::new(A)).unwrap();
    servant.add_singleton(|| Arc::new(B)).unwrap();
    servant.add_transient(|| Arc::new(C)).unwrap();
    servant.add_transient(|| Arc::new(D)).unwrap();
    servant
        .add_transient(|_a: Arc<A>, _b: Arc<B>, _c: Arc<C>, _d: Arc<D>| {
            Arc::new(Aggregate { parts: 4 })
        })
        .unwrap();

    assert_eq!(servant.serve::<Aggregate>().await.unwrap().parts, 4);
}

#[tokio::test]
async fn test_constructed_registration() {
    struct Clock {
        now: u64,
    }
    struct Scheduler {
        clock: Arc<Clock>,
    }

    impl Construct for Scheduler {
        type Dependencies = (Arc<Clock>,);

        fn construct((clock,): Self::Dependencies) -> Self {
            Scheduler { clock }
        }
    }

    let servant = Servant::new();
    servant.add_singleton_instance(Arc::new(Clock { now: 17 })).unwrap();
    servant.add_singleton_constructed::<Scheduler>().unwrap();

    let a = servant.serve::<Scheduler>().await.unwrap();
    let b = servant.serve::<Scheduler>().await.unwrap();
    assert_eq!(a.clock.now, 17);
    assert!(Arc::ptr_eq(&a, &b));
}

#[tokio::test]
async fn test_constructed_transient() {
    struct Ticket;
    impl Construct for Ticket {
        type Dependencies = ();

        fn construct(_: ()) -> Self {
            Ticket
        }
    }

    let servant = Servant::new();
    servant.add_constructed::<Ticket>(Lifestyle::Transient).unwrap();

    let a = servant.serve::<Ticket>().await.unwrap();
    let b = servant.serve::<Ticket>().await.unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
}

#[tokio::test]
async fn test_serve_key_returns_erased_instance() {
    let servant = Servant::new();
    servant.add_singleton(|| Arc::new(5u64)).unwrap();

    let instance = servant.serve_key(&TypeKey::of::<u64>()).await.unwrap();
    assert!(instance.is_instance_of(&TypeKey::of::<u64>()));
    assert_eq!(*instance.downcast::<u64>().unwrap(), 5);
    assert!(instance.downcast::<u32>().is_none());
}

#[tokio::test]
async fn test_registered_types_in_order() {
    struct First;
    struct Second;
    struct Third;

    let servant = Servant::new();
    servant.add_singleton(|| Arc::new(Second)).unwrap();
    servant.add_singleton(|_s: Arc<Second>| Arc::new(First)).unwrap();
    servant.add_transient(|| Arc::new(Third)).unwrap();

    let types = servant.registered_types();
    assert_eq!(
        types,
        vec![TypeKey::of::<Second>(), TypeKey::of::<First>(), TypeKey::of::<Third>()]
    );
    assert!(servant.is_type_registered(&TypeKey::of::<Third>()));
}

#[tokio::test]
async fn test_placeholder_entries_are_not_registered() {
    struct Missing;
    struct Needy;

    let servant = Servant::new();
    servant.add_transient(|_m: Arc<Missing>| Arc::new(Needy)).unwrap();

    assert!(servant.is_registered::<Needy>());
    assert!(!servant.is_registered::<Missing>());
    assert_eq!(servant.registered_types(), vec![TypeKey::of::<Needy>()]);
}

#[tokio::test]
async fn test_clones_share_registry() {
    let servant = Servant::new();
    let clone = servant.clone();
    clone.add_singleton(|| Arc::new(1i32)).unwrap();

    assert!(servant.is_registered::<i32>());
    let a = servant.serve::<i32>().await.unwrap();
    let b = clone.serve::<i32>().await.unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[tokio::test]
async fn test_debug_lists_entries() {
    struct Leaf;
    struct Root;
    struct Ghost;

    let servant = Servant::new();
    servant.add_singleton(|| Arc::new(Leaf)).unwrap();
    servant
        .add_transient(|_l: Arc<Leaf>, _g: Arc<Ghost>| Arc::new(Root))
        .unwrap();

    let debug = format!("{:?}", servant);
    assert!(debug.contains("Leaf (0 dependencies)"));
    assert!(debug.contains("Root (2 dependencies)"));
    assert!(debug.contains("Ghost (no provider)"));
}
