//! Actors own their state and receive events over unbounded channels. Every
//! event travels with the span that was current when it was sent, so the
//! receiving side logs inside the sender's context.

pub mod broadcast;
pub mod dock;

use tokio::sync::mpsc;
use tracing::Span;

pub type Receiver<Event> = mpsc::UnboundedReceiver<(Span, Event)>;

#[derive(Debug)]
pub struct Sender<Event>(mpsc::UnboundedSender<(Span, Event)>);

impl<Event> Clone for Sender<Event> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

pub fn channel<Event>() -> (Sender<Event>, Receiver<Event>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Sender(tx), rx)
}

impl<Event> Sender<Event> {
    /// Sends `event`, dropping it if the receiving actor has gone away.
    pub fn send(&self, event: Event) { _ = self.try_send(event); }

    pub fn try_send(&self, event: Event) -> Result<(), mpsc::error::SendError<(Span, Event)>> {
        self.0.send((Span::current(), event))
    }
}
