//! Tracing output from allocator and operation dispatch

use pang_runtime::{Machine, Op};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Capture {
    type Writer = Capture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn capture<F: FnOnce()>(filter: &str, f: F) -> String {
    let sink = Capture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(sink.clone())
        .with_ansi(false)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    sink.contents()
}

#[test]
fn test_allocator_decisions_are_logged() {
    let output = capture("pang_core=debug", || {
        let mut m = Machine::new();
        m.run(&[Op::PushInt(1), Op::PushInt(2), Op::Purge(1), Op::PushInt(3)])
            .unwrap();
    });
    assert!(output.contains("bump allocation"));
    assert!(output.contains("release"));
    assert!(output.contains("alloc_slot: reused free block tail"));
}

#[test]
fn test_operations_are_traced() {
    let output = capture("pang_runtime=trace", || {
        let mut m = Machine::new();
        m.run(&[Op::PushInt(1), Op::Quote]).unwrap();
    });
    assert!(output.contains("exec"));
    assert!(output.contains("op=\"quote\"") || output.contains("op=quote"));
}

#[test]
fn test_full_reset_is_logged() {
    let output = capture("pang_runtime=debug", || {
        let mut m = Machine::new();
        m.run(&[Op::PushInt(1), Op::Purge(0)]).unwrap();
    });
    assert!(output.contains("purge: full reset"));
    assert!(output.contains("dropped=1"));
}
