//! Warning collection mechanism for note conversion.
//!
//! Conversion is synchronous, so the collector is a thread-local scope: every
//! warning raised while a note is being converted is attached to that note's
//! [`ParsedNote`](crate::ParsedNote) in addition to being logged.

use std::cell::RefCell;

thread_local! {
    static WARNINGS: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

/// Collect a warning message for the note currently being converted.
/// If called outside of a warning collection scope, the warning is ignored.
pub fn collect(message: impl Into<String>) {
    WARNINGS.with(|warnings| {
        if let Some(warnings) = warnings.borrow_mut().as_mut() {
            warnings.push(message.into());
        }
    });
}

/// Run a closure with warning collection enabled, returning the collected warnings.
///
/// Scopes nest: the enclosing scope is restored once `f` returns.
pub fn collect_warnings<F, T>(f: F) -> (T, Vec<String>)
where
    F: FnOnce() -> T,
{
    let outer = WARNINGS.with(|warnings| warnings.borrow_mut().replace(Vec::new()));
    let result = f();
    let collected = WARNINGS.with(|warnings| std::mem::replace(&mut *warnings.borrow_mut(), outer));
    (result, collected.unwrap_or_default())
}

/// Macro to emit a warning that will be collected for the current note.
#[macro_export]
macro_rules! warn_note {
    ($($arg:tt)*) => {
        $crate::warning::collect(format!($($arg)*))
    };
}
