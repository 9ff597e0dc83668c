//! Medición de tiempos con reloj monótono (`Instant`), en nanosegundos.
//!
//! `ScopedMeasurement` registra al soltarse, así el tiempo queda registrado
//! en cualquier salida: retorno normal, `Err` o panic.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

#[derive(Debug, Default)]
pub struct Stopwatch {
    last_ns: AtomicU64,
    total_ns: AtomicU64,
    measurements: AtomicU64,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) -> ScopedMeasurement<'_> {
        ScopedMeasurement { watch: self,
                            started: Instant::now() }
    }

    /// Duración de la última medición.
    pub fn elapsed_ns(&self) -> u64 {
        self.last_ns.load(Ordering::Acquire)
    }

    pub fn total_ns(&self) -> u64 {
        self.total_ns.load(Ordering::Acquire)
    }

    pub fn measurements(&self) -> u64 {
        self.measurements.load(Ordering::Acquire)
    }

    fn record(&self, ns: u64) {
        self.last_ns.store(ns, Ordering::Release);
        self.total_ns.fetch_add(ns, Ordering::AcqRel);
        self.measurements.fetch_add(1, Ordering::AcqRel);
    }
}

/// Guard de una medición en curso.
#[derive(Debug)]
pub struct ScopedMeasurement<'a> {
    watch: &'a Stopwatch,
    started: Instant,
}

impl Drop for ScopedMeasurement<'_> {
    fn drop(&mut self) {
        let ns = u64::try_from(self.started.elapsed().as_nanos()).unwrap_or(u64::MAX);
        self.watch.record(ns);
    }
}

/// Ejecuta operaciones bajo medición y devuelve su resultado sin tocarlo.
#[derive(Debug, Default)]
pub struct TimedRunner {
    watch: Stopwatch,
}

impl TimedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run<T, E, F>(&self, op: F) -> Result<T, E>
        where F: FnOnce() -> Result<T, E>
    {
        let _measurement = self.watch.start();
        op()
    }

    pub fn elapsed_ns(&self) -> u64 {
        self.watch.elapsed_ns()
    }

    pub fn stopwatch(&self) -> &Stopwatch {
        &self.watch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn failure_is_returned_unchanged_and_timed() {
        let runner = TimedRunner::new();
        let res: Result<(), String> = runner.run(|| Err("boom".to_string()));
        assert_eq!(res, Err("boom".to_string()));
        assert_eq!(runner.stopwatch().measurements(), 1);
    }

    #[test]
    fn panic_still_records_measurement() {
        let runner = TimedRunner::new();
        let caught = catch_unwind(AssertUnwindSafe(|| runner.run::<(), (), _>(|| panic!("kaput"))));
        assert!(caught.is_err());
        assert_eq!(runner.stopwatch().measurements(), 1);
        assert!(runner.stopwatch().total_ns() >= runner.elapsed_ns());
    }
}
