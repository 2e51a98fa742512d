use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::stream::{Stream, StreamExt};

use crate::error::CoreResult;
use crate::http_client::SseLine;

pub const DATA_PREFIX: &str = "data: ";
pub const DONE_SENTINEL: &str = "[DONE]";

/// One `data: ` frame of the response stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub payload: String,
    pub terminal: bool,
}

impl EventRecord {
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }
}

/// Parse a single raw line. Anything that is not a `data: ` line (blank
/// separators, `event:` names, `:` comments) yields `None`.
pub fn parse_frame_line(line: &str) -> Option<EventRecord> {
    let payload = line.strip_prefix(DATA_PREFIX)?;
    Some(EventRecord {
        payload: payload.to_string(),
        terminal: payload == DONE_SENTINEL,
    })
}

/// Lazily adapts a line stream into a stream of `EventRecord`s.
///
/// Ends after yielding the terminal record without polling the source again,
/// or when the source ends. A source error is yielded once and ends the stream.
pub struct EventFrames<S> {
    lines: S,
    done: bool,
}

impl<S> EventFrames<S>
where
    S: Stream<Item = CoreResult<SseLine>> + Unpin,
{
    pub fn new(lines: S) -> Self {
        Self { lines, done: false }
    }
}

impl<S> Stream for EventFrames<S>
where
    S: Stream<Item = CoreResult<SseLine>> + Unpin,
{
    type Item = CoreResult<EventRecord>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.done {
            return Poll::Ready(None);
        }
        loop {
            match self.lines.poll_next_unpin(cx) {
                Poll::Ready(Some(Ok(SseLine { line }))) => {
                    let Some(record) = parse_frame_line(&line) else {
                        continue;
                    };
                    if record.terminal {
                        self.done = true;
                    }
                    return Poll::Ready(Some(Ok(record)));
                }
                Poll::Ready(Some(Err(e))) => {
                    self.done = true;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(None) => {
                    self.done = true;
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
