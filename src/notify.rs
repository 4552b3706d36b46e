use tokio::sync::broadcast;

use crate::model::GridEvent;

const CHANNEL_CAPACITY: usize = 256;

/// Broadcast hub for grid events of one session.
pub struct NotifyHub {
    sender: broadcast::Sender<GridEvent>,
}

impl NotifyHub {
    pub fn new() -> Self {
        Self {
            sender: broadcast::channel(CHANNEL_CAPACITY).0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GridEvent> {
        self.sender.subscribe()
    }

    /// Send a notification. No-op if nobody is listening.
    pub fn send(&self, event: GridEvent) {
        let _ = self.sender.send(event);
    }

    pub fn listeners(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for NotifyHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SelectionMode;

    #[tokio::test]
    async fn every_listener_sees_each_event() {
        let hub = NotifyHub::new();
        let mut grid_view = hub.subscribe();
        let mut summary_panel = hub.subscribe();
        assert_eq!(hub.listeners(), 2);

        hub.send(GridEvent::ModeChanged {
            mode: SelectionMode::Multi,
        });
        hub.send(GridEvent::PendingChanged { pending: 3 });

        for rx in [&mut grid_view, &mut summary_panel] {
            assert_eq!(
                rx.recv().await.unwrap(),
                GridEvent::ModeChanged {
                    mode: SelectionMode::Multi
                }
            );
            assert_eq!(rx.recv().await.unwrap(), GridEvent::PendingChanged { pending: 3 });
        }
    }

    #[tokio::test]
    async fn slow_listener_lags_then_catches_up() {
        let hub = NotifyHub::new();
        let mut rx = hub.subscribe();
        for pending in 0..CHANNEL_CAPACITY + 10 {
            hub.send(GridEvent::PendingChanged { pending });
        }

        match rx.recv().await {
            Err(broadcast::error::RecvError::Lagged(missed)) => assert_eq!(missed, 10),
            other => panic!("expected lag, got {other:?}"),
        }
        // Oldest surviving event comes next; a re-render from grid state
        // covers what was skipped.
        assert_eq!(rx.recv().await.unwrap(), GridEvent::PendingChanged { pending: 10 });
    }

    #[tokio::test]
    async fn dropped_listener_stops_counting() {
        let hub = NotifyHub::new();
        let rx = hub.subscribe();
        assert_eq!(hub.listeners(), 1);
        drop(rx);
        assert_eq!(hub.listeners(), 0);
        hub.send(GridEvent::ConfirmDismissed);
    }
}
