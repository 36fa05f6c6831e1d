pub mod stats_flusher;
