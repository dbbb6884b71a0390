// ============================================================================
// spark-emitter - Ergonomic Macros
// ============================================================================

/// Helper macro to clone variables into a move closure.
///
/// This reduces the boilerplate of manually cloning `Rc`, `Emitter` or
/// `Observable` handles before moving them into a callback.
///
/// # Usage
///
/// ```rust
/// use spark_emitter::{cloned, Callback, EmitterCapable, Observable, Value};
///
/// let source = Observable::new();
/// let mirror = Observable::new();
///
/// source.on("change:title", Callback::new(cloned!(mirror => move |_event, args| {
///     mirror.set("title", args[0].clone());
/// })));
///
/// source.set("title", "hello");
/// assert_eq!(mirror.get("title"), Value::from("hello"));
/// ```
#[macro_export]
macro_rules! cloned {
    ($($n:ident),+ => $e:expr) => {
        {
            $( let $n = $n.clone(); )+
            $e
        }
    };
}

/// Build the flat `(observable, property, ..)` list for
/// [`Binder::to`](crate::Binder::to).
///
/// Each element is converted with [`BindArg::from`](crate::BindArg), so
/// observables are passed by reference and property names as string
/// literals.
///
/// # Usage
///
/// ```rust
/// use spark_emitter::{sources, Observable, Target};
///
/// let a = Observable::new();
/// let b = Observable::new();
/// let view = Observable::new();
///
/// let target = Target::new(|values| assert_eq!(values.len(), 2));
/// view.bind(&target).unwrap().to(&sources![&a, "left", &b, "right"]).unwrap();
/// ```
#[macro_export]
macro_rules! sources {
    ($($arg:expr),* $(,)?) => {
        [$($crate::BindArg::from($arg)),*]
    };
}
