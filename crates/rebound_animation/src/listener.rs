//! Animation listeners

use slotmap::new_key_type;

new_key_type! {
    /// Handle returned by `add_listener`, used to remove it again
    pub struct ListenerId;
}

/// Receives lifecycle and value events from an `AnimationController`
///
/// Every method has an empty default, so implementors only override what
/// they need. Per run the order is always: `on_start`, any number of
/// `on_update`, then either `on_cancel` + `on_end` or `on_end` alone.
pub trait AnimationListener {
    /// Motion began (after any start delay)
    fn on_start(&self) {}

    fn on_update(&self, _value: f32) {}

    /// The run was cancelled; `on_end` follows immediately
    fn on_cancel(&self) {}

    /// Fires exactly once per run
    fn on_end(&self) {}
}

type Hook = Box<dyn Fn()>;
type UpdateHook = Box<dyn Fn(f32)>;

/// Closure-based listener
///
/// ```ignore
/// controller.add_listener(
///     Callbacks::new()
///         .on_update(|value| println!("{value}"))
///         .on_end(|| println!("done")),
/// );
/// ```
#[derive(Default)]
pub struct Callbacks {
    start: Option<Hook>,
    update: Option<UpdateHook>,
    cancel: Option<Hook>,
    end: Option<Hook>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_start(mut self, f: impl Fn() + 'static) -> Self {
        self.start = Some(Box::new(f));
        self
    }

    pub fn on_update(mut self, f: impl Fn(f32) + 'static) -> Self {
        self.update = Some(Box::new(f));
        self
    }

    pub fn on_cancel(mut self, f: impl Fn() + 'static) -> Self {
        self.cancel = Some(Box::new(f));
        self
    }

    pub fn on_end(mut self, f: impl Fn() + 'static) -> Self {
        self.end = Some(Box::new(f));
        self
    }
}

impl AnimationListener for Callbacks {
    fn on_start(&self) {
        if let Some(f) = &self.start {
            f();
        }
    }

    fn on_update(&self, value: f32) {
        if let Some(f) = &self.update {
            f(value);
        }
    }

    fn on_cancel(&self) {
        if let Some(f) = &self.cancel {
            f();
        }
    }

    fn on_end(&self) {
        if let Some(f) = &self.end {
            f();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_callbacks_forward_events() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (a, b, c, d) = (log.clone(), log.clone(), log.clone(), log.clone());

        let callbacks = Callbacks::new()
            .on_start(move || a.borrow_mut().push("start".to_string()))
            .on_update(move |v| b.borrow_mut().push(format!("update {v}")))
            .on_cancel(move || c.borrow_mut().push("cancel".to_string()))
            .on_end(move || d.borrow_mut().push("end".to_string()));

        // Builder methods share these names, so call through the trait
        AnimationListener::on_start(&callbacks);
        AnimationListener::on_update(&callbacks, 0.5);
        AnimationListener::on_cancel(&callbacks);
        AnimationListener::on_end(&callbacks);

        assert_eq!(
            *log.borrow(),
            vec!["start", "update 0.5", "cancel", "end"]
        );
    }

    #[test]
    fn test_missing_callbacks_are_ignored() {
        let ended = Rc::new(RefCell::new(false));
        let flag = ended.clone();
        let callbacks = Callbacks::new().on_end(move || *flag.borrow_mut() = true);

        AnimationListener::on_start(&callbacks);
        AnimationListener::on_update(&callbacks, 1.0);
        AnimationListener::on_end(&callbacks);

        assert!(*ended.borrow());
    }
}
