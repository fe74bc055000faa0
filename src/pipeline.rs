//! Thread-safe input event queue.
//!
//! Multi-producer, single-logical-consumer FIFO connecting the host's
//! device-event decoders to the terminal consumer. Producers never block
//! and never fail; the consumer chooses between non-blocking [`poll`]
//! and blocking [`read`]. Closing is permanent: already-queued events
//! remain consumable until drained, after which every query returns the
//! EOF sentinel forever. This models "the terminal went away" without
//! losing buffered input.
//!
//! [`poll`]: InputPipeline::poll
//! [`read`]: InputPipeline::read

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};

use crate::input::Input;

#[derive(Debug, Default)]
struct PipelineState {
    queue: VecDeque<Input>,
    closed: bool,
}

#[derive(Debug, Default)]
struct PipelineInner {
    state: Mutex<PipelineState>,
    available: Condvar,
}

/// Ordered, thread-safe queue of [`Input`] events.
///
/// Cloning yields another handle to the same queue; hand clones to
/// producer threads.
#[derive(Debug, Clone, Default)]
pub struct InputPipeline {
    inner: Arc<PipelineInner>,
}

impl InputPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue an event. Never blocks and never fails; events offered
    /// after [`close`](Self::close) are still delivered in order ahead of
    /// the EOF sentinel.
    pub fn offer(&self, event: Input) {
        let mut state = match self.inner.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.queue.push_back(event);
        self.inner.available.notify_one();
    }

    /// Non-blocking consume. Returns `None` when the queue is empty and
    /// the pipeline is open; once closed and drained, returns the EOF
    /// sentinel forever.
    pub fn poll(&self) -> Option<Input> {
        let mut state = match self.inner.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        match state.queue.pop_front() {
            Some(event) => Some(event),
            None if state.closed => Some(Input::eof()),
            None => None,
        }
    }

    /// Blocking consume. Suspends the calling thread until an event is
    /// offered or the pipeline is closed; a closed, drained pipeline
    /// returns the EOF sentinel immediately.
    pub fn read(&self) -> Input {
        let mut state = match self.inner.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        loop {
            if let Some(event) = state.queue.pop_front() {
                return event;
            }
            if state.closed {
                return Input::eof();
            }
            state = match self.inner.available.wait(state) {
                Ok(state) => state,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
    }

    /// Close the pipeline. Permanent: there is no re-open. Wakes every
    /// blocked reader.
    pub fn close(&self) {
        let mut state = match self.inner.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !state.closed {
            state.closed = true;
            log::debug!("input pipeline closed, {} events queued", state.queue.len());
        }
        drop(state);
        self.inner.available.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        match self.inner.state.lock() {
            Ok(state) => state.closed,
            Err(poisoned) => poisoned.into_inner().closed,
        }
    }

    /// Number of events currently queued.
    pub fn len(&self) -> usize {
        match self.inner.state.lock() {
            Ok(state) => state.queue.len(),
            Err(poisoned) => poisoned.into_inner().queue.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{KeyEvent, KeyKind};
    use std::thread;
    use std::time::Duration;

    fn key(c: char) -> Input {
        Input::from(KeyEvent::character(c))
    }

    #[test]
    fn test_poll_empty_open_pipeline() {
        let pipeline = InputPipeline::new();
        assert_eq!(pipeline.poll(), None);
    }

    #[test]
    fn test_fifo_order() {
        let pipeline = InputPipeline::new();
        // Events carry creation timestamps, so equality requires comparing
        // against the very values offered.
        let (a, b, c) = (key('a'), key('b'), key('c'));
        pipeline.offer(a);
        pipeline.offer(b);
        pipeline.offer(c);

        assert_eq!(pipeline.read(), a);
        assert_eq!(pipeline.poll(), Some(b));
        assert_eq!(pipeline.read(), c);
        assert_eq!(pipeline.poll(), None);
    }

    #[test]
    fn test_close_drains_then_eof_forever() {
        let pipeline = InputPipeline::new();
        let (x, y) = (key('x'), key('y'));
        pipeline.offer(x);
        pipeline.offer(y);
        pipeline.close();

        assert_eq!(pipeline.read(), x);
        assert_eq!(pipeline.read(), y);
        assert!(pipeline.read().is_eof());
        assert!(pipeline.read().is_eof());
        assert!(pipeline.poll().unwrap().is_eof());
    }

    #[test]
    fn test_close_is_permanent() {
        let pipeline = InputPipeline::new();
        pipeline.close();
        pipeline.close();
        assert!(pipeline.is_closed());
        assert!(pipeline.read().is_eof());
    }

    #[test]
    fn test_read_blocks_until_offer() {
        let pipeline = InputPipeline::new();
        let producer = pipeline.clone();

        let handle = thread::spawn(move || pipeline.read());
        thread::sleep(Duration::from_millis(20));
        let z = key('z');
        producer.offer(z);

        assert_eq!(handle.join().unwrap(), z);
    }

    #[test]
    fn test_read_woken_by_close() {
        let pipeline = InputPipeline::new();
        let closer = pipeline.clone();

        let handle = thread::spawn(move || pipeline.read());
        thread::sleep(Duration::from_millis(20));
        closer.close();

        assert!(handle.join().unwrap().is_eof());
    }

    #[test]
    fn test_multi_producer_preserves_per_producer_order() {
        let pipeline = InputPipeline::new();
        let mut handles = Vec::new();
        for producer_id in 0..4u8 {
            let producer = pipeline.clone();
            handles.push(thread::spawn(move || {
                let glyph = char::from(b'0' + producer_id);
                for _ in 0..25 {
                    producer.offer(Input::from(KeyEvent::character(glyph)));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        pipeline.close();

        let mut counts = [0usize; 4];
        loop {
            let event = pipeline.read();
            if event.is_eof() {
                break;
            }
            if let Input::Key(KeyEvent {
                kind: KeyKind::Character,
                glyph: Some(glyph),
                ..
            }) = event
            {
                counts[(glyph as u8 - b'0') as usize] += 1;
            }
        }
        assert_eq!(counts, [25, 25, 25, 25]);
    }

    #[test]
    fn test_offer_after_close_still_delivered() {
        let pipeline = InputPipeline::new();
        pipeline.close();
        let l = key('l');
        pipeline.offer(l);
        assert_eq!(pipeline.read(), l);
        assert!(pipeline.read().is_eof());
    }
}
