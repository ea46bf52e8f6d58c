//! Non-learning baseline that scans the alphabet for a rewarded symbol.

use super::error::AgentError;
use super::Learner;
use crate::core::alphabet::Alphabet;

/// Emits one symbol repeatedly, moving to the next symbol on every
/// non-positive reward until something pays off.
///
/// Once a symbol is rewarded the agent keeps emitting it. The first
/// non-positive reward after that restarts the scan from index 0.
#[derive(Debug, Clone)]
pub struct ScanningAgent {
    alphabet: Alphabet,
    searching: bool,
    pointer: usize,
}

impl Default for ScanningAgent {
    fn default() -> Self {
        Self::new(Alphabet::default())
    }
}

impl ScanningAgent {
    /// Start scanning at index 0.
    pub fn new(alphabet: Alphabet) -> Self {
        Self {
            alphabet,
            searching: true,
            pointer: 0,
        }
    }

    /// Index of the symbol currently emitted.
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Whether no rewarded symbol has been found yet.
    pub fn is_searching(&self) -> bool {
        self.searching
    }
}

impl Learner for ScanningAgent {
    fn reward(&mut self, reward: Option<f32>) -> Result<(), AgentError> {
        match reward {
            Some(r) if r > 0.0 => self.searching = false,
            _ if self.searching => self.pointer = (self.pointer + 1) % self.alphabet.len(),
            _ => {
                self.searching = true;
                self.pointer = 0;
            }
        }
        Ok(())
    }

    fn next(&mut self, input: char) -> Result<char, AgentError> {
        self.alphabet.encode(input)?;
        Ok(self.alphabet.cycle(self.pointer))
    }
}
