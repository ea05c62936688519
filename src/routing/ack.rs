//! One-shot acknowledgements for subscribe, unsubscribe and publish requests.
//!
//! A [`PendingAck`] resolves once the transport has accepted (or refused) a
//! request locally. It says nothing about the service's answer, which arrives
//! later on an `accepted`/`rejected` topic.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use arcstr::ArcStr;
use tokio::sync::oneshot;

use crate::transport::TransportError;

/// Outcome of a transport request.
pub type AckResult = Result<(), TransportError>;

type AckCallback = Box<dyn FnOnce(AckResult) + Send + 'static>;

struct AckState {
	resolved: bool,
	sender: Option<oneshot::Sender<AckResult>>,
	callback: Option<AckCallback>,
}

struct AckCell {
	state: Mutex<AckState>,
}

impl AckCell {
	fn lock(&self) -> MutexGuard<'_, AckState> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}

	fn resolve(&self, result: AckResult) -> bool {
		let mut state = self.lock();
		if state.resolved {
			return false;
		}
		state.resolved = true;
		match state.callback.take() {
			| Some(callback) => {
				// Never run caller code under the lock.
				drop(state);
				callback(result);
			}
			| None => {
				if let Some(sender) = state.sender.take() {
					let _ = sender.send(result);
				}
			}
		}
		true
	}

	fn is_resolved(&self) -> bool {
		self.lock().resolved
	}
}

/// Creates a linked completer/acknowledgement pair for a request on `topic`.
pub fn pending_ack(topic: ArcStr) -> (AckCompleter, PendingAck) {
	let (sender, receiver) = oneshot::channel();
	let cell = Arc::new(AckCell {
		state: Mutex::new(AckState {
			resolved: false,
			sender: Some(sender),
			callback: None,
		}),
	});
	let completer = AckCompleter {
		cell: Arc::clone(&cell),
		_guard: Arc::new(CompletionGuard {
			cell: Arc::clone(&cell),
		}),
	};
	let ack = PendingAck {
		topic,
		cell,
		receiver,
	};
	(completer, ack)
}

/// Resolving side of a [`PendingAck`].
///
/// Clones share one resolution: the first `complete` wins and later attempts
/// return `false`. When the last clone is dropped unresolved the ack resolves
/// with [`TransportError::ConnectionClosed`].
#[derive(Clone)]
pub struct AckCompleter {
	cell: Arc<AckCell>,
	_guard: Arc<CompletionGuard>,
}

impl AckCompleter {
	/// Resolves the acknowledgement. Returns `false` if it was already resolved.
	pub fn complete(&self, result: AckResult) -> bool {
		self.cell.resolve(result)
	}

	/// Whether the acknowledgement has been resolved.
	pub fn is_resolved(&self) -> bool {
		self.cell.is_resolved()
	}
}

impl fmt::Debug for AckCompleter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AckCompleter")
			.field("resolved", &self.is_resolved())
			.finish()
	}
}

struct CompletionGuard {
	cell: Arc<AckCell>,
}

impl Drop for CompletionGuard {
	fn drop(&mut self) {
		self.cell.resolve(Err(TransportError::ConnectionClosed));
	}
}

/// Local acknowledgement of a subscribe, unsubscribe or publish request.
///
/// Await it, or hand it a callback with [`PendingAck::on_complete`]. Dropping
/// it does not cancel the request.
#[must_use = "a PendingAck reports whether the transport accepted the request"]
pub struct PendingAck {
	topic: ArcStr,
	cell: Arc<AckCell>,
	receiver: oneshot::Receiver<AckResult>,
}

impl PendingAck {
	/// Topic the request concerns.
	pub fn topic(&self) -> &ArcStr {
		&self.topic
	}

	/// Whether the transport has already answered.
	pub fn is_resolved(&self) -> bool {
		self.cell.is_resolved()
	}

	/// Runs `callback` exactly once with the outcome.
	///
	/// If the outcome is already known the callback runs immediately on the
	/// calling thread, otherwise on whichever task resolves the request.
	pub fn on_complete<C>(mut self, callback: C)
	where C: FnOnce(AckResult) + Send + 'static {
		let mut state = self.cell.lock();
		if state.resolved {
			drop(state);
			let result = self
				.receiver
				.try_recv()
				.unwrap_or(Err(TransportError::ConnectionClosed));
			callback(result);
		} else {
			state.callback = Some(Box::new(callback));
		}
	}
}

impl Future for PendingAck {
	type Output = AckResult;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		Pin::new(&mut self.receiver)
			.poll(cx)
			.map(|received| received.unwrap_or(Err(TransportError::ConnectionClosed)))
	}
}

impl fmt::Debug for PendingAck {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PendingAck")
			.field("topic", &self.topic)
			.field("resolved", &self.is_resolved())
			.finish()
	}
}
