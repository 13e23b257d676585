use biometrics::{Collector, Counter, Moments};

pub(crate) static PROXY_REQUESTS: Counter = Counter::new("chatbot.proxy.requests");
pub(crate) static PROXY_INVALID_REQUESTS: Counter = Counter::new("chatbot.proxy.invalid_requests");
pub(crate) static PROXY_CONFIGURATION_ERRORS: Counter =
    Counter::new("chatbot.proxy.configuration_errors");
pub(crate) static PROXY_UPSTREAM_ERRORS: Counter = Counter::new("chatbot.proxy.upstream_errors");
pub(crate) static PROXY_INTERNAL_ERRORS: Counter = Counter::new("chatbot.proxy.internal_errors");
pub(crate) static PROXY_FALLBACK_REPLIES: Counter = Counter::new("chatbot.proxy.fallback_replies");
pub(crate) static PROXY_REQUEST_DURATION: Moments =
    Moments::new("chatbot.proxy.request_duration_seconds");

pub(crate) static SESSION_TURNS: Counter = Counter::new("chatbot.session.turns");
pub(crate) static SESSION_FAILED_TURNS: Counter = Counter::new("chatbot.session.failed_turns");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&PROXY_REQUESTS);
    collector.register_counter(&PROXY_INVALID_REQUESTS);
    collector.register_counter(&PROXY_CONFIGURATION_ERRORS);
    collector.register_counter(&PROXY_UPSTREAM_ERRORS);
    collector.register_counter(&PROXY_INTERNAL_ERRORS);
    collector.register_counter(&PROXY_FALLBACK_REPLIES);
    collector.register_moments(&PROXY_REQUEST_DURATION);

    collector.register_counter(&SESSION_TURNS);
    collector.register_counter(&SESSION_FAILED_TURNS);
}
