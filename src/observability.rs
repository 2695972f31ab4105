use biometrics::{Collector, Counter, Moments};

pub(crate) static GATEWAY_REQUESTS: Counter = Counter::new("castor.gateway.requests");
pub(crate) static GATEWAY_REQUEST_ERRORS: Counter = Counter::new("castor.gateway.request_errors");
pub(crate) static GATEWAY_REQUEST_DURATION: Moments =
    Moments::new("castor.gateway.request_duration_seconds");

pub(crate) static TURNS_ROLLED_BACK: Counter = Counter::new("castor.session.turns_rolled_back");
pub(crate) static CODE_BLOCKS_SAVED: Counter = Counter::new("castor.chat.code_blocks_saved");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&GATEWAY_REQUESTS);
    collector.register_counter(&GATEWAY_REQUEST_ERRORS);
    collector.register_moments(&GATEWAY_REQUEST_DURATION);

    collector.register_counter(&TURNS_ROLLED_BACK);
    collector.register_counter(&CODE_BLOCKS_SAVED);
}
