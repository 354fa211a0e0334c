//! Expression pedal flag events.
//!
//! The pedal interface raises a flag line when the attached pedal draws too
//! much current. The interrupt handler must not touch the engine directly;
//! it enqueues a [`PedalEvent`] on the producer half of a [`PedalQueue`] and
//! the owner of the codec drains the consumer half with
//! [`Codec::process_events`](crate::Codec::process_events) on its normal call
//! path.
//!
//! ```ignore
//! static mut QUEUE: PedalQueue<4> = PedalQueue::new();
//! let (mut producer, mut consumer) = unsafe { QUEUE.split() };
//!
//! // interrupt context
//! let _ = producer.enqueue(PedalEvent::FlagRaised { flag1: true, flag2: false });
//!
//! // task context
//! codec.process_events(&mut consumer)?;
//! ```

use heapless::spsc::{Consumer, Producer, Queue};

/// Notification from the pedal interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PedalEvent {
    /// A pedal flag line fired. The levels sampled in the handler are kept
    /// for logging.
    FlagRaised { flag1: bool, flag2: bool },
}

/// Single-producer single-consumer queue between the flag interrupt and the
/// codec owner. Holds `N - 1` events.
pub type PedalQueue<const N: usize> = Queue<PedalEvent, N>;

/// Interrupt-side half of a [`PedalQueue`].
pub type PedalProducer<'a, const N: usize> = Producer<'a, PedalEvent, N>;

/// Task-side half of a [`PedalQueue`].
pub type PedalConsumer<'a, const N: usize> = Consumer<'a, PedalEvent, N>;

/// Post a flag event from interrupt context.
///
/// Returns `false` when the queue is full; the pending events already ask
/// for the same action, so a dropped event loses nothing.
pub fn raise_flag<const N: usize>(producer: &mut PedalProducer<'_, N>, flag1: bool, flag2: bool) -> bool {
    producer.enqueue(PedalEvent::FlagRaised { flag1, flag2 }).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_queue_reports_drop() {
        let mut queue: PedalQueue<3> = PedalQueue::new();
        let (mut producer, mut consumer) = queue.split();
        assert!(raise_flag(&mut producer, true, false));
        assert!(raise_flag(&mut producer, false, true));
        assert!(!raise_flag(&mut producer, true, true));
        assert_eq!(consumer.dequeue(), Some(PedalEvent::FlagRaised { flag1: true, flag2: false }));
        assert_eq!(consumer.dequeue(), Some(PedalEvent::FlagRaised { flag1: false, flag2: true }));
        assert_eq!(consumer.dequeue(), None);
    }
}
