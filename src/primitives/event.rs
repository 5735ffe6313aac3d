use std::rc::Rc;

use gpui::App;

/// An event handed to a control's listeners.
///
/// Calling [`prevent_default`](Self::prevent_default) vetoes the transition
/// the event announces, such as committing a value, opening a panel or
/// toggling an expandable section.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlEvent<T> {
    payload: T,
    default_prevented: bool,
}

impl<T> ControlEvent<T> {
    pub fn new(payload: T) -> Self {
        Self {
            payload,
            default_prevented: false,
        }
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// A caller supplied listener receiving a [`ControlEvent`].
pub type Listener<T, Cx = App> = Rc<dyn Fn(&mut ControlEvent<T>, &mut Cx)>;

/// Calls `listener` with `payload`. Returns `false` when it prevented the
/// default.
pub fn emit<T, Cx>(listener: Option<&Listener<T, Cx>>, payload: T, cx: &mut Cx) -> bool {
    let Some(listener) = listener.cloned() else {
        return true;
    };

    let mut event = ControlEvent::new(payload);
    listener(&mut event, cx);
    !event.default_prevented()
}
