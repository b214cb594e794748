// Chart Grid - Dense step x channel bitmap
// Each step is a channel mask; channel 0 is the least-significant bit of the packed value

use std::ops::Range;

/// Number of output channels (game columns)
pub const CHANNEL_COUNT: usize = 4;

const CHANNEL_MASK: u8 = (1 << CHANNEL_COUNT) - 1;

/// One fixed-duration slot on the grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Step(u8);

impl Step {
    /// A step with every channel inactive
    pub const EMPTY: Step = Step(0);

    /// Build a step from its packed value; bits above the channel count are dropped
    pub fn from_packed(value: u8) -> Self {
        Step(value & CHANNEL_MASK)
    }

    /// Build a step from per-channel flags
    pub fn from_channels(channels: [bool; CHANNEL_COUNT]) -> Self {
        let mut step = Step::EMPTY;
        for (channel, &active) in channels.iter().enumerate() {
            if active {
                step.activate(channel);
            }
        }
        step
    }

    /// Packed value: channel N is bit N
    pub fn packed(&self) -> u8 {
        self.0
    }

    pub fn is_active(&self, channel: usize) -> bool {
        channel < CHANNEL_COUNT && self.0 & (1 << channel) != 0
    }

    pub fn channels(&self) -> [bool; CHANNEL_COUNT] {
        let mut channels = [false; CHANNEL_COUNT];
        for (channel, flag) in channels.iter_mut().enumerate() {
            *flag = self.is_active(channel);
        }
        channels
    }

    /// Number of channels active in this step
    pub fn active_count(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    fn activate(&mut self, channel: usize) {
        if channel < CHANNEL_COUNT {
            self.0 |= 1 << channel;
        }
    }
}

/// The finished chart: an ordered run of steps sharing one step duration
///
/// Only the chart builder mutates a grid. Encoders and the statistics
/// collector read it through shared references.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartGrid {
    /// Duration of every step, in seconds
    step_duration: f64,

    /// Step masks in address order
    steps: Vec<Step>,
}

impl ChartGrid {
    /// All-inactive grid of `length` steps
    pub(crate) fn empty(step_duration: f64, length: usize) -> Self {
        ChartGrid {
            step_duration,
            steps: vec![Step::EMPTY; length],
        }
    }

    /// Reassemble a grid from decoded steps
    pub fn from_steps(step_duration: f64, steps: Vec<Step>) -> Self {
        ChartGrid {
            step_duration,
            steps,
        }
    }

    /// Reassemble a grid from packed per-step values
    pub fn from_packed(step_duration: f64, values: &[u8]) -> Self {
        ChartGrid::from_steps(
            step_duration,
            values.iter().map(|&v| Step::from_packed(v)).collect(),
        )
    }

    /// Number of steps needed to cover `max_time` plus the trailing margin
    ///
    /// Returned as a float so callers can reject absurd lengths before
    /// allocating.
    pub fn length_for(max_time: f64, trailing_margin: f64, step_duration: f64) -> f64 {
        ((max_time + trailing_margin) / step_duration).ceil()
    }

    pub fn step_duration(&self) -> f64 {
        self.step_duration
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn channel_count(&self) -> usize {
        CHANNEL_COUNT
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Total grid duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.steps.len() as f64 * self.step_duration
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<Step> {
        self.steps.get(index).copied()
    }

    pub fn is_active(&self, step: usize, channel: usize) -> bool {
        self.steps
            .get(step)
            .map(|s| s.is_active(channel))
            .unwrap_or(false)
    }

    /// Packed value of every step, in address order
    pub fn packed_values(&self) -> Vec<u8> {
        self.steps.iter().map(Step::packed).collect()
    }

    /// Whether `channel` is active anywhere in `steps`
    pub(crate) fn any_active_in(&self, channel: usize, steps: Range<usize>) -> bool {
        let end = steps.end.min(self.steps.len());
        let start = steps.start.min(end);
        self.steps[start..end].iter().any(|s| s.is_active(channel))
    }

    pub(crate) fn activate(&mut self, step: usize, channel: usize) {
        if let Some(slot) = self.steps.get_mut(step) {
            slot.activate(channel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_packing_order() {
        let step = Step::from_channels([true, false, true, false]);
        assert_eq!(step.packed(), 0b0101);

        let step = Step::from_channels([false, false, false, true]);
        assert_eq!(step.packed(), 0b1000);
    }

    #[test]
    fn test_step_from_packed_masks_high_bits() {
        let step = Step::from_packed(0xF3);
        assert_eq!(step.packed(), 0x3);
        assert_eq!(step.channels(), [true, true, false, false]);
        assert_eq!(step.active_count(), 2);
    }

    #[test]
    fn test_step_out_of_range_channel() {
        let step = Step::from_packed(0xF);
        assert!(!step.is_active(CHANNEL_COUNT));
    }

    #[test]
    fn test_grid_duration() {
        let grid = ChartGrid::empty(0.25, 8);
        assert_eq!(grid.step_count(), 8);
        assert!((grid.duration_seconds() - 2.0).abs() < 1e-9);
        assert_eq!(grid.channel_count(), 4);
    }

    #[test]
    fn test_any_active_in() {
        let mut grid = ChartGrid::empty(0.05, 10);
        grid.activate(3, 2);

        assert!(grid.any_active_in(2, 0..4));
        assert!(grid.any_active_in(2, 3..4));
        assert!(!grid.any_active_in(2, 0..3));
        assert!(!grid.any_active_in(1, 0..10));
        // Ranges past the end are clamped
        assert!(!grid.any_active_in(2, 8..20));
    }

    #[test]
    fn test_length_for_rounds_up() {
        assert_eq!(ChartGrid::length_for(1.0, 0.0, 0.25), 4.0);
        assert_eq!(ChartGrid::length_for(1.1, 0.0, 0.25), 5.0);
        assert_eq!(ChartGrid::length_for(0.0, 5.0, 0.05), 100.0);
    }

    #[test]
    fn test_from_packed_round_trip() {
        let grid = ChartGrid::from_packed(0.05, &[0, 1, 0xA, 0xF]);
        assert_eq!(grid.packed_values(), vec![0, 1, 0xA, 0xF]);
        assert!(grid.is_active(2, 1));
        assert!(grid.is_active(2, 3));
        assert!(!grid.is_active(2, 0));
        assert!(!grid.is_active(99, 0));
    }
}
