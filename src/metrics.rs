use dashmap::DashMap;
use std::fmt::Write;

pub const DEFAULT_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

pub trait MetricsSink: Send + Sync {
    fn increment_request_counter(&self, service: &str, method: &str, status: &str);

    fn observe_request_duration(&self, service: &str, method: &str, seconds: f64);

    fn record_registration(&self, _service: &str, _outcome: &str) {}

    fn record_discovery(&self, _service: &str, _target_nf_type: &str, _outcome: &str) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn increment_request_counter(&self, _service: &str, _method: &str, _status: &str) {}

    fn observe_request_duration(&self, _service: &str, _method: &str, _seconds: f64) {}
}

#[derive(Debug, Clone)]
pub struct Histogram {
    bucket_counts: Vec<u64>,
    sum: f64,
    count: u64,
}

impl Histogram {
    fn new() -> Self {
        Self {
            bucket_counts: vec![0; DEFAULT_BUCKETS.len()],
            sum: 0.0,
            count: 0,
        }
    }

    fn observe(&mut self, value: f64) {
        for (bound, slot) in DEFAULT_BUCKETS.iter().zip(self.bucket_counts.iter_mut()) {
            if value <= *bound {
                *slot += 1;
            }
        }
        self.sum += value;
        self.count += 1;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }
}

type RequestKey = (String, String, String);
type DurationKey = (String, String);

#[derive(Debug, Default)]
pub struct RequestMetrics {
    requests: DashMap<RequestKey, u64>,
    durations: DashMap<DurationKey, Histogram>,
    registrations: DashMap<DurationKey, u64>,
    discoveries: DashMap<RequestKey, u64>,
}

impl RequestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_count(&self, service: &str, method: &str, status: &str) -> u64 {
        self.requests
            .get(&(service.to_string(), method.to_string(), status.to_string()))
            .map(|count| *count)
            .unwrap_or(0)
    }

    pub fn duration(&self, service: &str, method: &str) -> Option<Histogram> {
        self.durations
            .get(&(service.to_string(), method.to_string()))
            .map(|h| h.clone())
    }

    pub fn registration_count(&self, service: &str, outcome: &str) -> u64 {
        self.registrations
            .get(&(service.to_string(), outcome.to_string()))
            .map(|count| *count)
            .unwrap_or(0)
    }

    pub fn discovery_count(&self, service: &str, target_nf_type: &str, outcome: &str) -> u64 {
        self.discoveries
            .get(&(service.to_string(), target_nf_type.to_string(), outcome.to_string()))
            .map(|count| *count)
            .unwrap_or(0)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("# HELP requests_total Total number of requests processed\n");
        out.push_str("# TYPE requests_total counter\n");
        for ((service, method, status), count) in sorted(&self.requests) {
            let _ = writeln!(
                out,
                "requests_total{{service=\"{}\",method=\"{}\",status=\"{}\"}} {}",
                service, method, status, count
            );
        }

        out.push_str("# HELP request_duration_seconds Duration of requests in seconds\n");
        out.push_str("# TYPE request_duration_seconds histogram\n");
        for ((service, method), histogram) in sorted(&self.durations) {
            for (bound, count) in DEFAULT_BUCKETS.iter().zip(histogram.bucket_counts.iter()) {
                let _ = writeln!(
                    out,
                    "request_duration_seconds_bucket{{service=\"{}\",method=\"{}\",le=\"{}\"}} {}",
                    service, method, bound, count
                );
            }
            let _ = writeln!(
                out,
                "request_duration_seconds_bucket{{service=\"{}\",method=\"{}\",le=\"+Inf\"}} {}",
                service, method, histogram.count
            );
            let _ = writeln!(
                out,
                "request_duration_seconds_sum{{service=\"{}\",method=\"{}\"}} {}",
                service, method, histogram.sum
            );
            let _ = writeln!(
                out,
                "request_duration_seconds_count{{service=\"{}\",method=\"{}\"}} {}",
                service, method, histogram.count
            );
        }

        out.push_str("# HELP service_registrations_total Total number of service registrations with NRF\n");
        out.push_str("# TYPE service_registrations_total counter\n");
        for ((service, status), count) in sorted(&self.registrations) {
            let _ = writeln!(
                out,
                "service_registrations_total{{service=\"{}\",status=\"{}\"}} {}",
                service, status, count
            );
        }

        out.push_str("# HELP service_discoveries_total Total number of service discoveries from NRF\n");
        out.push_str("# TYPE service_discoveries_total counter\n");
        for ((service, target, status), count) in sorted(&self.discoveries) {
            let _ = writeln!(
                out,
                "service_discoveries_total{{service=\"{}\",target_service=\"{}\",status=\"{}\"}} {}",
                service, target, status, count
            );
        }

        out
    }
}

fn sorted<K, V>(map: &DashMap<K, V>) -> Vec<(K, V)>
where
    K: Clone + Ord + std::hash::Hash + Eq,
    V: Clone,
{
    let mut entries: Vec<(K, V)> = map
        .iter()
        .map(|entry| (entry.key().clone(), entry.value().clone()))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
}

impl MetricsSink for RequestMetrics {
    fn increment_request_counter(&self, service: &str, method: &str, status: &str) {
        *self
            .requests
            .entry((service.to_string(), method.to_string(), status.to_string()))
            .or_insert(0) += 1;
    }

    fn observe_request_duration(&self, service: &str, method: &str, seconds: f64) {
        self.durations
            .entry((service.to_string(), method.to_string()))
            .or_insert_with(Histogram::new)
            .observe(seconds);
    }

    fn record_registration(&self, service: &str, outcome: &str) {
        *self
            .registrations
            .entry((service.to_string(), outcome.to_string()))
            .or_insert(0) += 1;
    }

    fn record_discovery(&self, service: &str, target_nf_type: &str, outcome: &str) {
        *self
            .discoveries
            .entry((service.to_string(), target_nf_type.to_string(), outcome.to_string()))
            .or_insert(0) += 1;
    }
}
