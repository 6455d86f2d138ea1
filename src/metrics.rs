use std::sync::LazyLock;

use prometheus::*;

static METRIC_REQUEST_COUNT: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "vpmatch_request_count",
        "count of handled upload, seed and search requests",
        &["route", "status"]
    )
    .unwrap()
});

static METRIC_INDEX_FAILURE_COUNT: LazyLock<IntCounter> = LazyLock::new(|| {
    register_int_counter!(
        "vpmatch_index_failure_count",
        "count of background indexing failures"
    )
    .unwrap()
});

static METRIC_SEARCH_HITS: LazyLock<Histogram> = LazyLock::new(|| {
    register_histogram!(
        "vpmatch_search_hits",
        "number of hits kept after score filtering",
        vec![0., 1., 2., 5., 10., 20., 50., 100.]
    )
    .unwrap()
});

/// 记录请求结果
pub fn inc_request(route: &str, ok: bool) {
    let status = if ok { "ok" } else { "error" };
    METRIC_REQUEST_COUNT.with_label_values(&[route, status]).inc();
}

pub fn inc_index_failure() {
    METRIC_INDEX_FAILURE_COUNT.inc();
}

pub fn observe_search_hits(count: usize) {
    METRIC_SEARCH_HITS.observe(count as f64);
}
