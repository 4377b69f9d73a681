use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::time_series::{samples, SampleBuffer, TimeSeries};
use crate::error::{Result, ScopeError};

/// Name of a simulated signal; curves refer to their data through it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SignalRef(pub String);

impl SignalRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SignalRef {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SignalRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for SignalRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub struct SignalData {
    pub name: SignalRef,
    pub series: Box<dyn TimeSeries>,
    pub snap: Option<SampleBuffer>,
}

impl SignalData {
    /// Freeze the current samples so a render can read them while the
    /// simulation keeps writing. Samples with unordered or non-finite times
    /// cannot be frozen; the signal is then read live.
    pub fn take_snapshot(&mut self) -> Result<()> {
        let series = self.series.as_ref();
        let points = samples(series, 0..series.len()).collect();
        match SampleBuffer::from_points(points) {
            Ok(snap) => {
                self.snap = Some(snap);
                Ok(())
            }
            Err(e) => {
                self.snap = None;
                Err(e)
            }
        }
    }

    pub fn clear_snapshot(&mut self) {
        self.snap = None;
    }

    /// The series renders should read: the snapshot when one exists.
    pub fn view(&self) -> &dyn TimeSeries {
        match &self.snap {
            Some(snap) => snap as &dyn TimeSeries,
            None => self.series.as_ref(),
        }
    }
}

/// Simulation output owned by the producer. The display side only borrows
/// from it; signal order is the registration order.
#[derive(Default)]
pub struct SignalStore {
    signals: HashMap<SignalRef, SignalData>,
    order: Vec<SignalRef>,
}

impl SignalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<S: TimeSeries + 'static>(&mut self, name: impl Into<SignalRef>, series: S) {
        let name = name.into();
        if !self.signals.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.signals.insert(
            name.clone(),
            SignalData {
                name,
                series: Box::new(series),
                snap: None,
            },
        );
    }

    pub fn remove(&mut self, name: &SignalRef) -> Option<SignalData> {
        self.order.retain(|n| n != name);
        self.signals.remove(name)
    }

    pub fn get(&self, name: &SignalRef) -> Option<&SignalData> {
        self.signals.get(name)
    }

    pub fn get_mut(&mut self, name: &SignalRef) -> Option<&mut SignalData> {
        self.signals.get_mut(name)
    }

    pub fn series(&self, name: &SignalRef) -> Result<&dyn TimeSeries> {
        self.get(name)
            .map(SignalData::view)
            .ok_or_else(|| ScopeError::domain(format!("unknown signal '{name}'")))
    }

    pub fn contains(&self, name: &SignalRef) -> bool {
        self.signals.contains_key(name)
    }

    pub fn order(&self) -> &[SignalRef] {
        &self.order
    }

    /// Signal at registration position `index` (used by channel selections).
    pub fn by_index(&self, index: usize) -> Option<&SignalData> {
        self.order.get(index).and_then(|n| self.signals.get(n))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SignalData> + '_ {
        self.order.iter().filter_map(|n| self.signals.get(n))
    }

    /// Snapshot every signal. Signals that fail are logged and left live;
    /// the first failure is returned.
    pub fn take_snapshot(&mut self) -> Result<()> {
        let mut result = Ok(());
        for signal in self.signals.values_mut() {
            if let Err(e) = signal.take_snapshot() {
                log::warn!("cannot snapshot signal '{}': {e}", signal.name);
                result = result.and(Err(e));
            }
        }
        result
    }

    pub fn clear_snapshot(&mut self) {
        for signal in self.signals.values_mut() {
            signal.clear_snapshot();
        }
    }

    pub fn has_snapshot(&self) -> bool {
        !self.signals.is_empty() && self.signals.values().all(|s| s.snap.is_some())
    }
}
