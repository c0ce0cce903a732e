//! The arithmetic channel: run an effect, then read its result back.
//!
//! Effects report a result by writing the reserved global variable
//! [`TEMP_VAR`](crate::vars::TEMP_VAR). Each computed evaluation opens its own
//! result frame on a thread-local stack, and reads and writes of the reserved
//! variable go to the innermost open frame. A computed value nested inside
//! another computed value's effect therefore gets its own slot and cannot
//! clobber the outer result.
//!
//! With no frame open the reserved variable is an ordinary global.

use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::dialogue::TalkContext;
use crate::effect::Effect;

static NEXT_EVALUATION_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
struct ResultFrame {
    evaluation_id: u64,
    value: Option<String>,
}

thread_local! {
    static RESULT_FRAMES: RefCell<Vec<ResultFrame>> = const { RefCell::new(Vec::new()) };
}

/// An open result frame. Closing or dropping it removes the frame.
#[derive(Debug)]
pub struct ScratchFrame {
    evaluation_id: u64,
}

impl ScratchFrame {
    /// Open a new innermost frame.
    pub fn open() -> Self {
        let evaluation_id = NEXT_EVALUATION_ID.fetch_add(1, Ordering::Relaxed);
        RESULT_FRAMES.with(|frames| {
            frames.borrow_mut().push(ResultFrame {
                evaluation_id,
                value: None,
            })
        });
        tracing::trace!(evaluation_id, "opened result frame");
        Self { evaluation_id }
    }

    pub fn evaluation_id(&self) -> u64 {
        self.evaluation_id
    }

    /// Close the frame and return what was written to it, empty if nothing.
    pub fn close(self) -> String {
        remove_frame(self.evaluation_id).unwrap_or_default()
    }
}

impl Drop for ScratchFrame {
    fn drop(&mut self) {
        remove_frame(self.evaluation_id);
    }
}

fn remove_frame(evaluation_id: u64) -> Option<String> {
    RESULT_FRAMES.with(|frames| {
        let mut frames = frames.borrow_mut();
        let index = frames
            .iter()
            .rposition(|frame| frame.evaluation_id == evaluation_id)?;
        frames.remove(index).value
    })
}

/// Store a result in the innermost frame. Returns false when none is open.
pub(crate) fn write_scratch(value: &str) -> bool {
    RESULT_FRAMES.with(|frames| match frames.borrow_mut().last_mut() {
        Some(frame) => {
            frame.value = Some(value.to_string());
            true
        }
        None => false,
    })
}

/// Read the innermost frame's result, `None` when no frame is open.
pub(crate) fn read_scratch() -> Option<String> {
    RESULT_FRAMES.with(|frames| {
        frames
            .borrow()
            .last()
            .map(|frame| frame.value.clone().unwrap_or_default())
    })
}

/// Number of frames currently open on this thread.
pub fn open_frames() -> usize {
    RESULT_FRAMES.with(|frames| frames.borrow().len())
}

/// Run `effect` against `d` inside a fresh frame and return its result text.
pub fn evaluate_computed<T: TalkContext>(effect: &Effect<T>, d: &T) -> String {
    let frame = ScratchFrame::open();
    effect(d);
    frame.close()
}
