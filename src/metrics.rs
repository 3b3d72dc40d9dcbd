use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_gauge, Encoder, IntCounter, IntGauge, TextEncoder,
};

lazy_static! {
    pub static ref PLAYLIST_FETCH_FAILURES: IntCounter = register_int_counter!(
        "livetv_playlist_fetch_failures_total",
        "Playlist loads that failed to retrieve their document"
    )
    .unwrap();
    pub static ref CHANNELS_PARSED: IntCounter = register_int_counter!(
        "livetv_channels_parsed_total",
        "Channels produced by successful playlist loads"
    )
    .unwrap();
    pub static ref LAST_LOAD_CHANNELS: IntGauge = register_int_gauge!(
        "livetv_last_load_channels",
        "Channels returned by the most recent multi-playlist load"
    )
    .unwrap();
}

pub fn gather_metrics() -> anyhow::Result<String> {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
