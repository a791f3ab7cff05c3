//! `TableTracingLayer` with the `log` bridge installed.
//!
//! Kept in its own test binary because it installs the global subscriber.
//!
//! Run with: cargo test --features tracing --test tracing_bridge

#![cfg(feature = "tracing")]

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use log::LevelFilter;
use tracing_subscriber::prelude::*;

use gridbox::logging::TableTracingLayer;
use gridbox::prelude::*;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_layer_ignores_bridged_diagnostics() {
    let capture = Capture::default();
    let logger = TableLogger::with_writer(capture.clone())
        .level(LevelFilter::Trace)
        .show_time(false)
        .show_path(false);

    // try_init also routes `log` records into tracing
    tracing_subscriber::registry()
        .with(TableTracingLayer::with_logger(logger))
        .try_init()
        .unwrap();

    tracing::info!("hello");
    assert_eq!(capture.contents(), "INFO │hello\n");
}
