//! Scripted dice for tests.

use std::collections::VecDeque;

use skirmish_core::rng::DeterministicRng;

/// Always returns `min`: every die rolls a 1.
#[derive(Debug)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }
}

/// Plays back a script of rolls, one per call, clamped into the requested
/// range so a script cannot roll an 11 on a d10.
///
/// # Panics
///
/// Rolling past the end of the script panics, so a test that rolls more
/// dice than it scripted fails loudly.
#[derive(Debug)]
pub struct SequenceRng {
    script: VecDeque<u32>,
    consumed: usize,
}

impl SequenceRng {
    /// A script that plays `values` in order.
    #[must_use]
    pub fn new(values: Vec<u32>) -> Self {
        Self {
            script: values.into(),
            consumed: 0,
        }
    }

    /// Number of rolls played so far.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Number of rolls left in the script.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        let Some(value) = self.script.pop_front() else {
            panic!(
                "SequenceRng script exhausted after {} rolls",
                self.consumed
            );
        };
        self.consumed += 1;
        value.clamp(min, max.max(min))
    }
}
