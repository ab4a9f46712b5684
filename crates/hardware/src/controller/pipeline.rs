//! Write-data pipeline.
//!
//! A fixed-capacity circular buffer that lets the client hand over write data before the WRITE
//! command that consumes it. It provides:
//! 1. **Submit:** The client side enqueues `(byte_enable, data)` while the buffer is not full.
//! 2. **Consume:** The sequencer dequeues the oldest word when it reaches the write-issue point.
//! 3. **Data Ready:** A registered valid flag modelling one cycle of output latency.
//!
//! Both sides act during a tick against the state committed at the previous edge; [`clock`]
//! commits them together. The storage is an arena plus two wrapping indices, so one slot is
//! always left empty to tell "full" from "empty".
//!
//! [`clock`]: WriteDataPipeline::clock

use tracing::trace;

use crate::common::PipelineError;

/// One buffered write beat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriteWord {
    /// Per-lane enable; bit `n` enables byte lane `n`.
    pub byte_enable: u8,
    /// Data word.
    pub data: u16,
}

/// Single-producer single-consumer write FIFO.
#[derive(Clone, Debug)]
pub struct WriteDataPipeline {
    slots: Vec<WriteWord>,
    /// Next slot to write.
    wr: usize,
    /// Oldest buffered slot.
    rd: usize,
    /// Occupancy was zero at the previous edge.
    prev_empty: bool,
    /// A submit and consume at occupancy one collided on the previous tick.
    hold: bool,
    staged_submit: Option<WriteWord>,
    staged_consume: bool,
}

impl WriteDataPipeline {
    /// Creates an empty pipeline with `depth` physical slots (`depth - 1` usable).
    ///
    /// # Arguments
    ///
    /// * `depth` - Physical slot count. Values below 2 are raised to 2.
    pub fn new(depth: usize) -> Self {
        Self {
            slots: vec![WriteWord::default(); depth.max(2)],
            wr: 0,
            rd: 0,
            prev_empty: true,
            hold: false,
            staged_submit: None,
            staged_consume: false,
        }
    }

    /// Physical slot count `D`.
    #[inline]
    pub fn depth(&self) -> usize {
        self.slots.len()
    }

    /// Words that may be buffered at once, `D - 1`.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len() - 1
    }

    /// Words buffered as of the last edge, `(wr - rd) mod D`.
    #[inline]
    pub fn occupancy(&self) -> usize {
        let depth = self.slots.len();
        (self.wr + depth - self.rd) % depth
    }

    /// Returns `true` when nothing is buffered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.wr == self.rd
    }

    /// The "not full" flag: a submit this tick will be accepted.
    #[inline]
    pub fn can_submit(&self) -> bool {
        self.occupancy() < self.capacity()
    }

    /// The registered data-ready flag.
    ///
    /// Low while the buffer is empty, for the tick after it was empty, and for one tick after a
    /// submit and consume collided at occupancy one.
    #[inline]
    pub fn data_ready(&self) -> bool {
        !self.is_empty() && !self.prev_empty && !self.hold
    }

    /// Returns `true` while the one-tick hold after a colliding submit/consume is in force.
    #[inline]
    pub fn is_holding(&self) -> bool {
        self.hold
    }

    /// Stages `word` for insertion at the next edge.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Full`] when the not-full flag is low, [`PipelineError::DoubleSubmit`] if a
    /// word was already submitted this tick.
    pub fn submit(&mut self, word: WriteWord) -> Result<(), PipelineError> {
        if self.staged_submit.is_some() {
            return Err(PipelineError::DoubleSubmit);
        }
        if !self.can_submit() {
            return Err(PipelineError::Full {
                occupancy: self.occupancy(),
                capacity: self.capacity(),
            });
        }
        trace!(
            data = format_args!("{:#06x}", word.data),
            be = word.byte_enable,
            occupancy = self.occupancy(),
            "write pipeline submit"
        );
        self.staged_submit = Some(word);
        Ok(())
    }

    /// Takes the oldest word; the read index advances at the next edge.
    ///
    /// # Errors
    ///
    /// [`PipelineError::NotReady`] when the data-ready flag is low, [`PipelineError::DoubleConsume`]
    /// if a word was already consumed this tick.
    pub fn consume(&mut self) -> Result<WriteWord, PipelineError> {
        if self.staged_consume {
            return Err(PipelineError::DoubleConsume);
        }
        if !self.data_ready() {
            return Err(PipelineError::NotReady);
        }
        let word = self.slots[self.rd];
        trace!(
            data = format_args!("{:#06x}", word.data),
            be = word.byte_enable,
            occupancy = self.occupancy(),
            "write pipeline consume"
        );
        self.staged_consume = true;
        Ok(word)
    }

    /// Commits this tick's submit and consume at the clock edge.
    pub fn clock(&mut self) {
        let depth = self.slots.len();
        let before = self.occupancy();
        let submitted = self.staged_submit.take();
        let consumed = std::mem::take(&mut self.staged_consume);

        if let Some(word) = submitted {
            self.slots[self.wr] = word;
            self.wr = (self.wr + 1) % depth;
        }
        if consumed {
            self.rd = (self.rd + 1) % depth;
        }

        self.prev_empty = before == 0;
        self.hold = submitted.is_some() && consumed && self.occupancy() == 1;
    }

    /// Drops staged operations without committing them.
    pub(crate) fn discard_staged(&mut self) {
        self.staged_submit = None;
        self.staged_consume = false;
    }
}
