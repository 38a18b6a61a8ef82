use std::collections::VecDeque;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::ir::SelectionKey;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SelectionRequest {
    Select {
        key: SelectionKey,
        #[serde(rename = "multiSelect")]
        multi_select: bool,
    },
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("selection rejected by host: {0}")]
    Rejected(String),
    #[error("host unavailable")]
    Unavailable,
}

/// The host side of cross-panel selection.
pub trait SelectionHost {
    fn request(&mut self, request: &SelectionRequest) -> Result<(), HostError>;
}

/// A host that accepts and records every request.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub received: Vec<SelectionRequest>,
}

impl SelectionHost for RecordingHost {
    fn request(&mut self, request: &SelectionRequest) -> Result<(), HostError> {
        self.received.push(request.clone());
        Ok(())
    }
}

/// Requests queued during a synchronous handler, delivered afterwards.
#[derive(Debug, Default)]
pub struct HostNotifier {
    pending: VecDeque<SelectionRequest>,
}

impl HostNotifier {
    pub fn queue(&mut self, request: SelectionRequest) {
        self.pending.push_back(request);
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn drain(&mut self) -> Vec<SelectionRequest> {
        self.pending.drain(..).collect()
    }

    /// Deliver queued requests; failures are logged and dropped.
    /// Returns how many the host accepted.
    pub fn flush(&mut self, host: &mut dyn SelectionHost) -> usize {
        let mut delivered = 0;
        while let Some(request) = self.pending.pop_front() {
            match host.request(&request) {
                Ok(()) => {
                    debug!(?request, "selection delivered");
                    delivered += 1;
                }
                Err(err) => warn!(error = %err, "selection request failed, keeping local state"),
            }
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingHost;

    impl SelectionHost for FailingHost {
        fn request(&mut self, _request: &SelectionRequest) -> Result<(), HostError> {
            Err(HostError::Unavailable)
        }
    }

    #[test]
    fn flush_delivers_in_order() {
        let mut notifier = HostNotifier::default();
        notifier.queue(SelectionRequest::Clear);
        notifier.queue(SelectionRequest::Select {
            key: SelectionKey::from("row0:1"),
            multi_select: true,
        });
        let mut host = RecordingHost::default();
        assert_eq!(notifier.flush(&mut host), 2);
        assert_eq!(host.received[0], SelectionRequest::Clear);
        assert_eq!(notifier.pending(), 0);
    }

    #[test]
    fn failures_are_swallowed() {
        let mut notifier = HostNotifier::default();
        notifier.queue(SelectionRequest::Clear);
        assert_eq!(notifier.flush(&mut FailingHost), 0);
        assert_eq!(notifier.pending(), 0);
    }

    #[test]
    fn requests_serialize_for_the_host() {
        let json = serde_json::to_string(&SelectionRequest::Select {
            key: SelectionKey::from("row3:7"),
            multi_select: false,
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"select","key":"row3:7","multiSelect":false}"#);
    }
}
