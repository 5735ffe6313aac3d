use std::time::Duration;

use gpui::Context;

const BLINK_INTERVAL: Duration = Duration::from_millis(530);

/// Caret visibility. Every restart bumps the epoch, so timers of an older
/// cycle stop on their next tick.
pub struct CursorBlink {
    visible: bool,
    epoch: usize,
}

impl Default for CursorBlink {
    fn default() -> Self {
        Self {
            visible: true,
            epoch: 0,
        }
    }
}

impl CursorBlink {
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Shows the caret and restarts the cycle. Used on focus and after
    /// every edit or caret move.
    pub fn restart(&mut self, cx: &mut Context<Self>) {
        self.visible = true;
        self.epoch = self.epoch.wrapping_add(1);
        self.schedule(self.epoch, cx);
    }

    pub fn stop(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.visible = true;
    }

    fn schedule(&mut self, epoch: usize, cx: &mut Context<Self>) {
        cx.spawn(async move |this, cx| {
            cx.background_executor().timer(BLINK_INTERVAL).await;
            this.update(cx, |blink, cx| blink.tick(epoch, cx)).ok();
        })
        .detach();
    }

    fn tick(&mut self, epoch: usize, cx: &mut Context<Self>) {
        if epoch != self.epoch {
            return;
        }
        self.visible = !self.visible;
        cx.notify();
        self.schedule(epoch, cx);
    }
}
