use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("hfchat.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("hfchat.client.request_errors");
pub(crate) static CLIENT_EMPTY_RESPONSES: Counter = Counter::new("hfchat.client.empty_responses");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("hfchat.client.request_duration_seconds");

pub(crate) static SESSION_TURNS: Counter = Counter::new("hfchat.session.turns");
pub(crate) static SESSION_TURNS_UNCONFIGURED: Counter =
    Counter::new("hfchat.session.turns_unconfigured");
pub(crate) static SESSION_TURNS_FAILED: Counter = Counter::new("hfchat.session.turns_failed");
pub(crate) static SESSION_CLEARS: Counter = Counter::new("hfchat.session.clears");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_counter(&CLIENT_EMPTY_RESPONSES);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&SESSION_TURNS);
    collector.register_counter(&SESSION_TURNS_UNCONFIGURED);
    collector.register_counter(&SESSION_TURNS_FAILED);
    collector.register_counter(&SESSION_CLEARS);
}
