//! Request metrics and tracing spans.
//!
//! Counters go to the OpenTelemetry global meter `crmdesk`; the host
//! application decides where (if anywhere) they are exported.

#[cfg(feature = "metrics")]
pub use self::otel::{RequestMetrics, METRICS};

#[cfg(feature = "metrics")]
mod otel {
    use crate::source::Method;
    use once_cell::sync::Lazy;
    use opentelemetry::{
        global,
        metrics::{Counter, Histogram},
        KeyValue,
    };
    use std::time::Duration;

    pub static METRICS: Lazy<RequestMetrics> = Lazy::new(RequestMetrics::init);

    pub struct RequestMetrics {
        pub requests_total: Counter<u64>,
        pub request_failures_total: Counter<u64>,
        pub request_duration: Histogram<f64>,
    }

    impl RequestMetrics {
        pub fn init() -> Self {
            let meter = global::meter("crmdesk");

            let requests_total = meter
                .u64_counter("crmdesk_requests_total")
                .with_description("Total backend requests issued")
                .build();

            let request_failures_total = meter
                .u64_counter("crmdesk_request_failures_total")
                .with_description("Backend requests that ended in an HTTP or transport error")
                .build();

            let request_duration = meter
                .f64_histogram("crmdesk_request_duration_seconds")
                .with_description("Duration of backend requests")
                .build();

            Self {
                requests_total,
                request_failures_total,
                request_duration,
            }
        }

        pub fn record_request(&self, method: Method, elapsed: Duration, failed: bool) {
            let attrs = [KeyValue::new("method", method.as_str())];
            self.requests_total.add(1, &attrs);
            self.request_duration.record(elapsed.as_secs_f64(), &attrs);
            if failed {
                self.request_failures_total.add(1, &attrs);
            }
        }
    }
}

#[cfg(feature = "tracing")]
pub mod tracing_helpers {
    use crate::source::Method;
    use tracing::Span;

    pub fn request_span(method: Method, path: &str) -> Span {
        tracing::info_span!("crmdesk.request", method = method.as_str(), path = path)
    }

    pub fn login_span(username: &str) -> Span {
        tracing::info_span!("crmdesk.login", username = username)
    }
}
