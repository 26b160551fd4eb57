//! FFI Module Tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::*;
use crate::classpath::ClassName;

#[repr(C)]
struct Counter {
    n: i64,
}

unsafe extern "C" fn counter_bump(counter: *mut Counter, by: i32) {
    (*counter).n += by as i64;
}

unsafe extern "C" fn counter_bump_long(counter: *mut Counter, by: i64) {
    (*counter).n += by * 1000;
}

const BUMP: NativeMethod = NativeMethod::new("bump", "(I)V");
const BUMP_LONG: NativeMethod = NativeMethod::new("bump_long", "(J)V");

struct CounterNatives {
    bump: unsafe extern "C" fn(*mut Counter, i32),
    bump_long: unsafe extern "C" fn(*mut Counter, i64),
    _module: ModuleHandle,
}

impl std::fmt::Debug for CounterNatives {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CounterNatives").finish_non_exhaustive()
    }
}

impl NativeBindings for CounterNatives {
    const CLASS: &'static str = "test.Counter";
    const LIBRARY: &'static str = "counter";

    fn bind(binder: &Binder) -> Result<Self, FfiError> {
        // Safety: the pointer types match counter_bump / counter_bump_long
        unsafe {
            Ok(Self {
                bump: binder.function(&BUMP)?,
                bump_long: binder.function(&BUMP_LONG)?,
                _module: binder.module(),
            })
        }
    }
}

fn counter_module() -> StaticModule {
    StaticModule::from_symbols(
        "counter",
        [
            ("Java_test_Counter_bump", counter_bump as usize),
            // Only the long name is exported for bump_long
            ("Java_test_Counter_bump_1long__J", counter_bump_long as usize),
        ],
    )
}

/// Loader that counts its invocations and hands out `module`
fn counting_loader(
    module: Option<StaticModule>,
) -> (Arc<AtomicUsize>, impl ModuleLoader + 'static) {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let loader = move |name: &str| -> Result<ModuleHandle, FfiError> {
        seen.fetch_add(1, Ordering::SeqCst);
        match &module {
            Some(module) => Ok(module.clone().into_handle()),
            None => Err(FfiError::LibraryNotFound {
                name: name.to_string(),
                searched: 0,
            }),
        }
    };
    (calls, loader)
}

#[test]
fn test_ffi_type_display() {
    assert_eq!(FfiType::Int.to_string(), "I");
    assert_eq!(
        FfiType::Object("java/lang/String".to_string()).to_string(),
        "Ljava/lang/String;"
    );
    assert_eq!(FfiType::Array(Box::new(FfiType::Double)).to_string(), "[D");
    assert!(FfiType::Double.is_primitive());
    assert!(!FfiType::Array(Box::new(FfiType::Int)).is_primitive());
}

#[test]
fn test_descriptor_parsing() {
    let desc = MethodDescriptor::parse("(ILjava/lang/String;[[D)J").unwrap();
    assert_eq!(
        desc.params,
        vec![
            FfiType::Int,
            FfiType::Object("java/lang/String".to_string()),
            FfiType::Array(Box::new(FfiType::Array(Box::new(FfiType::Double)))),
        ]
    );
    assert_eq!(desc.return_type, FfiType::Long);
    assert_eq!(desc.to_string(), "(ILjava/lang/String;[[D)J");
    assert_eq!(desc.params_descriptor(), "ILjava/lang/String;[[D");
}

#[test]
fn test_descriptor_rejects_malformed() {
    let malformed = [
        "", "I)V", "(I", "(I)", "(V)V", "(L;)V", "(Ljava/lang/String)V", "(I)VV", "(Q)V", "([V)V",
    ];
    for bad in malformed {
        assert_eq!(
            MethodDescriptor::parse(bad),
            Err(FfiError::InvalidDescriptor(bad.to_string())),
            "{:?} should be rejected",
            bad
        );
    }
}

#[test]
fn test_symbol_names() {
    let class = ClassName::parse("terrajava.examples.extension.Accumulator").unwrap();
    assert_eq!(
        short_name(&class, "sqrt"),
        "Java_terrajava_examples_extension_Accumulator_sqrt"
    );
    let desc = MethodDescriptor::parse("(I)V").unwrap();
    assert_eq!(
        long_name(&class, "add", &desc),
        "Java_terrajava_examples_extension_Accumulator_add__I"
    );

    let inner = ClassName::parse("a.Outer$Inner").unwrap();
    assert_eq!(short_name(&inner, "go"), "Java_a_Outer_00024Inner_go");
}

#[test]
fn test_symbol_candidates() {
    let class = ClassName::parse("test.Counter").unwrap();
    assert_eq!(
        BUMP.symbol_candidates(&class).unwrap(),
        vec!["Java_test_Counter_bump", "Java_test_Counter_bump__I"]
    );

    let add = NativeMethod::overload("add", "(D)V");
    assert_eq!(
        add.symbol_candidates(&class).unwrap(),
        vec!["Java_test_Counter_add__D"]
    );

    let broken = NativeMethod::new("x", "(I");
    assert!(matches!(
        broken.symbol_candidates(&class),
        Err(FfiError::InvalidDescriptor(_))
    ));
}

#[test]
fn test_static_module_lookup() {
    let mut module = StaticModule::new("m");
    module.insert("f", 0x1000);
    assert_eq!(module.name(), "m");
    assert_eq!(module.symbol_address("f"), Ok(0x1000));
    assert_eq!(
        module.symbol_address("g"),
        Err(FfiError::SymbolNotFound {
            symbol: "g".to_string(),
            library: "m".to_string()
        })
    );
}

#[test]
fn test_native_class_binds_and_dispatches() {
    let (calls, loader) = counting_loader(Some(counter_module()));
    let class: NativeClass<CounterNatives> = NativeClass::new(loader);
    assert_eq!(class.library(), "counter");
    assert!(!class.is_bound());

    let natives = class.bind().unwrap();
    assert!(class.is_bound());

    let mut counter = Counter { n: 0 };
    unsafe {
        (natives.bump)(&mut counter, 5);
        (natives.bump_long)(&mut counter, 2);
    }
    assert_eq!(counter.n, 2005);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_binder_rejects_non_pointer_targets() {
    let binder = Binder::new("test.Counter", counter_module().into_handle()).unwrap();
    assert_eq!(binder.class().as_str(), "test.Counter");

    // Safety: the size check fails before any address is reinterpreted
    let wide = unsafe { binder.function::<[usize; 2]>(&BUMP) };
    assert!(matches!(wide, Err(FfiError::InvalidSymbol(_))));
    let narrow = unsafe { binder.function::<u8>(&BUMP) };
    assert!(matches!(narrow, Err(FfiError::InvalidSymbol(_))));

    let bump = unsafe { binder.function::<unsafe extern "C" fn(*mut Counter, i32)>(&BUMP) };
    assert!(bump.is_ok());
}

#[test]
fn test_native_class_loads_once() {
    let (calls, loader) = counting_loader(Some(counter_module()));
    let class: NativeClass<CounterNatives> = NativeClass::new(loader);

    for _ in 0..10 {
        assert!(class.binding().is_bound());
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(class.load_attempts(), 1);
}

#[test]
fn test_native_class_caches_failure() {
    let (calls, loader) = counting_loader(None);
    let class: NativeClass<CounterNatives> = NativeClass::new(loader);

    for _ in 0..3 {
        let err = class.bind().unwrap_err();
        assert!(matches!(
            err,
            BindingError::Load {
                cause: FfiError::LibraryNotFound { .. },
                ..
            }
        ));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!class.is_bound());
}

#[test]
fn test_missing_symbol_fails_bind() {
    let module =
        StaticModule::from_symbols("counter", [("Java_test_Counter_bump", counter_bump as usize)]);
    let (_, loader) = counting_loader(Some(module));
    let class: NativeClass<CounterNatives> = NativeClass::new(loader);

    match class.binding() {
        Binding::Unbound { library, cause } => {
            assert_eq!(library, "counter");
            assert_eq!(
                cause,
                FfiError::SymbolNotFound {
                    symbol: "Java_test_Counter_bump_1long__J".to_string(),
                    library: "counter".to_string()
                }
            );
        }
        Binding::Bound(_) => panic!("bind should fail without bump_long"),
    }
}

#[test]
fn test_unbound_natives_report_method() {
    let (_, loader) = counting_loader(None);
    let class: NativeClass<CounterNatives> = NativeClass::new(loader);
    let binding = class.binding();

    let err = binding.natives("bump").err().unwrap();
    match err {
        BindingError::Unbound { class, method, .. } => {
            assert_eq!(class, "test.Counter");
            assert_eq!(method, "bump");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_concurrent_first_use_loads_once() {
    let (calls, loader) = counting_loader(Some(counter_module()));
    let class: Arc<NativeClass<CounterNatives>> = Arc::new(NativeClass::new(loader));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let class = Arc::clone(&class);
            std::thread::spawn(move || class.binding().is_bound())
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_library_filename() {
    #[cfg(target_os = "linux")]
    {
        assert_eq!(library_filename("extension"), "libextension.so");
        assert_eq!(library_filename("libc.so.6"), "libc.so.6");
    }
    #[cfg(target_os = "macos")]
    assert_eq!(library_filename("extension"), "libextension.dylib");
    #[cfg(target_os = "windows")]
    assert_eq!(library_filename("extension"), "extension.dll");
}

#[test]
fn test_library_not_found() {
    let loader = LibraryLoader::with_search_paths(vec!["/nonexistent/terrajava".into()]);
    assert!(loader.find_library("no_such_library_xyz").is_none());
    assert_eq!(
        loader.load_library("no_such_library_xyz").err(),
        Some(FfiError::LibraryNotFound {
            name: "no_such_library_xyz".to_string(),
            searched: 1
        })
    );
    assert!(loader.loaded_libraries().is_empty());
}

#[test]
fn test_ffi_error_display() {
    let err = FfiError::SymbolNotFound {
        symbol: "Java_a_B_c".to_string(),
        library: "libx.so".to_string(),
    };
    assert!(err.to_string().contains("Java_a_B_c"));
    assert!(err.to_string().contains("libx.so"));

    let err = BindingError::Unbound {
        class: "a.B".to_string(),
        method: "c".to_string(),
        library: "x".to_string(),
        cause: FfiError::LoadError("boom".to_string()),
    };
    assert!(err.to_string().contains("a.B.c"));
    assert!(err.to_string().contains("boom"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_libc_loading() {
    // libc.so.6 is resolved by the system loader's own search
    if let Ok(library) = DynamicLibrary::load("libc.so.6") {
        assert_eq!(library.path(), std::path::Path::new("libc.so.6"));
        assert_eq!(library.name(), "libc.so.6");
        let addr = library.get_symbol("getpid").unwrap();
        assert_ne!(addr, 0);
        // Cached on second lookup
        assert_eq!(library.get_symbol("getpid").unwrap(), addr);

        assert!(matches!(
            library.get_symbol("definitely_not_a_libc_symbol"),
            Err(FfiError::SymbolNotFound { .. })
        ));
        assert!(matches!(
            library.get_symbol("nul\0inside"),
            Err(FfiError::InvalidSymbol(_))
        ));
    }
}
