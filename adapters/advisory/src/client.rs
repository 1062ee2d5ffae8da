use std::{
    collections::HashMap,
    io,
    sync::mpsc::{self, Receiver, Sender},
    thread,
};

use crate::{fallback, Advisor, AdvisoryTopic};

/// Identifier matching a response to the request that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AdvisoryTicket(u64);

impl AdvisoryTicket {
    /// Creates a ticket with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the ticket.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Where the text of a response came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdvisoryOrigin {
    /// Generated by the Advisory Service.
    Service,
    /// Canned text substituted after a failure or in local-only mode.
    Fallback,
}

/// Completed advisory request delivered back to the simulation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdvisoryResponse {
    /// Ticket returned when the request was submitted.
    pub ticket: AdvisoryTicket,
    /// Call site that issued the request.
    pub topic: AdvisoryTopic,
    /// Displayable text; never empty.
    pub text: String,
    /// Whether the text came from the service or the canned list.
    pub origin: AdvisoryOrigin,
}

#[derive(Debug)]
struct AdvisoryRequest {
    ticket: AdvisoryTicket,
    topic: AdvisoryTopic,
    prompt: String,
}

#[derive(Debug)]
enum Dispatch {
    Worker {
        requests: Sender<AdvisoryRequest>,
        responses: Receiver<AdvisoryResponse>,
    },
    Inline {
        advisor: Advisor,
    },
}

/// Fire-and-forget front end for the Advisory Service.
///
/// Submitting never blocks. Responses are collected with [`drain`], which the
/// simulation calls once per frame.
///
/// [`drain`]: AdvisoryClient::drain
#[derive(Debug)]
pub struct AdvisoryClient {
    dispatch: Dispatch,
    ready: Vec<AdvisoryResponse>,
    next_ticket: u64,
    submitted: HashMap<AdvisoryTopic, u32>,
}

impl AdvisoryClient {
    /// Starts a background worker thread that resolves requests in order.
    pub fn spawn(advisor: Advisor) -> io::Result<Self> {
        let (request_tx, request_rx) = mpsc::channel::<AdvisoryRequest>();
        let (response_tx, response_rx) = mpsc::channel::<AdvisoryResponse>();

        let _ = thread::Builder::new()
            .name("sentinel-advisory".to_owned())
            .spawn(move || {
                for request in request_rx {
                    let (text, origin) = advisor.resolve(request.topic, &request.prompt);
                    let response = AdvisoryResponse {
                        ticket: request.ticket,
                        topic: request.topic,
                        text,
                        origin,
                    };
                    if response_tx.send(response).is_err() {
                        break;
                    }
                }
                tracing::debug!("advisory worker stopped");
            })?;

        Ok(Self::with_dispatch(Dispatch::Worker {
            requests: request_tx,
            responses: response_rx,
        }))
    }

    /// Resolves requests synchronously during [`submit`]; responses are
    /// still only observable through [`drain`].
    ///
    /// [`submit`]: AdvisoryClient::submit
    /// [`drain`]: AdvisoryClient::drain
    #[must_use]
    pub fn inline(advisor: Advisor) -> Self {
        Self::with_dispatch(Dispatch::Inline { advisor })
    }

    fn with_dispatch(dispatch: Dispatch) -> Self {
        Self {
            dispatch,
            ready: Vec::new(),
            next_ticket: 0,
            submitted: HashMap::new(),
        }
    }

    /// Queues a request and returns the ticket its response will carry.
    pub fn submit(&mut self, topic: AdvisoryTopic, prompt: impl Into<String>) -> AdvisoryTicket {
        let ticket = AdvisoryTicket::new(self.next_ticket);
        self.next_ticket = self.next_ticket.saturating_add(1);
        let submitted = self.submitted.entry(topic).or_insert(0);
        *submitted = submitted.saturating_add(1);
        let submitted = *submitted;

        let request = AdvisoryRequest {
            ticket,
            topic,
            prompt: prompt.into(),
        };
        tracing::debug!(
            ticket = ticket.get(),
            ?topic,
            submitted,
            "advisory request submitted"
        );

        match &self.dispatch {
            Dispatch::Worker { requests, .. } => {
                if let Err(mpsc::SendError(request)) = requests.send(request) {
                    tracing::warn!(?topic, "advisory worker unavailable, using canned text");
                    self.ready.push(AdvisoryResponse {
                        ticket: request.ticket,
                        topic: request.topic,
                        text: fallback::pick(request.topic).to_owned(),
                        origin: AdvisoryOrigin::Fallback,
                    });
                }
            }
            Dispatch::Inline { advisor } => {
                let (text, origin) = advisor.resolve(request.topic, &request.prompt);
                self.ready.push(AdvisoryResponse {
                    ticket: request.ticket,
                    topic: request.topic,
                    text,
                    origin,
                });
            }
        }

        ticket
    }

    /// Collects every response that completed since the previous drain.
    pub fn drain(&mut self) -> Vec<AdvisoryResponse> {
        let mut delivered = std::mem::take(&mut self.ready);
        if let Dispatch::Worker { responses, .. } = &self.dispatch {
            delivered.extend(responses.try_iter());
        }
        delivered
    }

    /// Number of requests submitted for the topic since the client was created.
    ///
    /// The same per-topic tally is attached to the `debug` submission log, so
    /// request volume per topic can be audited without a remote service.
    #[must_use]
    pub fn submitted(&self, topic: AdvisoryTopic) -> u32 {
        self.submitted.get(&topic).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    #[test]
    fn inline_responses_wait_for_drain() {
        let mut client = AdvisoryClient::inline(Advisor::LocalOnly);
        let first = client.submit(AdvisoryTopic::OpeningLore, "lore");
        let second = client.submit(AdvisoryTopic::TacticalAdvice, "advice");

        assert_ne!(first, second);
        let responses = client.drain();
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].ticket, first);
        assert_eq!(responses[1].topic, AdvisoryTopic::TacticalAdvice);
        assert!(client.drain().is_empty(), "responses are delivered once");
    }

    #[test]
    fn submissions_are_counted_per_topic() {
        let mut client = AdvisoryClient::inline(Advisor::LocalOnly);
        let _ = client.submit(AdvisoryTopic::WaveLore, "lore");
        let _ = client.submit(AdvisoryTopic::WaveLore, "lore");

        assert_eq!(client.submitted(AdvisoryTopic::WaveLore), 2);
        assert_eq!(client.submitted(AdvisoryTopic::EndTaunt), 0);
    }

    #[test]
    fn worker_delivers_fallback_text() {
        let mut client = AdvisoryClient::spawn(Advisor::LocalOnly).expect("worker starts");
        let ticket = client.submit(AdvisoryTopic::EndTaunt, "taunt");

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut delivered = Vec::new();
        while delivered.is_empty() && Instant::now() < deadline {
            delivered = client.drain();
            thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].ticket, ticket);
        assert_eq!(
            delivered[0].text,
            "CORE_TERMINATED: ALL DATA BELONGS TO THE HIVE."
        );
        assert_eq!(delivered[0].origin, AdvisoryOrigin::Fallback);
    }
}
