// Scripted in-memory transport for tests

use bytes::Bytes;
use futures::future::BoxFuture;
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{UpstreamRequest, UpstreamResponse, UpstreamTransport};

pub enum MockReply {
    Respond(u16, String),
    Fail(String),
    /// Never completes; exercises timeouts and cancellation
    Hang,
}

pub struct MockTransport {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<UpstreamRequest>>,
}

impl MockTransport {
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<UpstreamRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl UpstreamTransport for MockTransport {
    fn send(&self, request: UpstreamRequest) -> BoxFuture<'_, Result<UpstreamResponse, String>> {
        // Counted when issued, not when answered
        self.requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MockReply::Fail("no scripted reply".to_string()));

        Box::pin(async move {
            match reply {
                MockReply::Respond(status, body) => Ok(UpstreamResponse {
                    status: StatusCode::from_u16(status).unwrap(),
                    body: Bytes::from(body),
                }),
                MockReply::Fail(e) => Err(e),
                MockReply::Hang => futures::future::pending().await,
            }
        })
    }
}
