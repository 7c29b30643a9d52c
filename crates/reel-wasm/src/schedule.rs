//! Deferred, coalesced flushes
//!
//! Engine callbacks fire while the player may be borrowed. They only
//! request a flush; the flush itself runs later on the microtask queue.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::debug;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

/// Returns a wake function that runs `run` on `target` once per burst of
/// wake-ups. If `target` is borrowed when the flush runs, the flush is
/// retried on the next task. Wake-ups after `target` is gone are ignored.
pub fn coalesced<T: 'static>(target: Weak<RefCell<T>>, run: fn(&mut T)) -> Rc<dyn Fn()> {
    let pending = Rc::new(Cell::new(false));
    Rc::new(move || arm(Rc::clone(&pending), target.clone(), run, false))
}

fn arm<T: 'static>(
    pending: Rc<Cell<bool>>,
    target: Weak<RefCell<T>>,
    run: fn(&mut T),
    retry: bool,
) {
    if pending.replace(true) {
        return;
    }
    wasm_bindgen_futures::spawn_local(async move {
        if retry {
            // Yield a whole task so the current borrow holder can finish
            let _ = next_task().await;
        }
        pending.set(false);
        let Some(strong) = target.upgrade() else {
            return;
        };
        let busy = match strong.try_borrow_mut() {
            Ok(mut value) => {
                run(&mut *value);
                false
            }
            Err(_) => true,
        };
        if busy {
            debug!("Flush target busy, retrying");
            arm(pending, target, run, true);
        }
    });
}

/// Resolves on a `setTimeout(0)` tick
fn next_task() -> JsFuture {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        let scheduled = web_sys::window()
            .map(|window| {
                window
                    .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, 0)
                    .is_ok()
            })
            .unwrap_or(false);
        if !scheduled {
            let _ = resolve.call0(&JsValue::UNDEFINED);
        }
    });
    JsFuture::from(promise)
}
