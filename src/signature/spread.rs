//! Peak spreading across frequency and time.
//!
//! Spread spectra are the comparison baseline for peak decisions: each cell
//! holds the max of a local footprint, so a candidate only survives if it
//! rises above everything near it. Frequency spreading is a 3-tap forward
//! max; time spreading folds the new spectrum into the ring cells written
//! 1, 3 and 6 passes earlier.

use super::ring::Ring;
use super::spectral::BIN_COUNT;

/// Ring slots holding the most recent spread spectra.
pub const SPECTRA_RING_SIZE: usize = 256;

/// Earlier passes updated by time-domain spreading, in application order.
/// The chain is order-sensitive: each step writes the max seen so far into
/// the older cell and then absorbs that cell's prior value into the chain.
pub const TIME_SPREAD_OFFSETS: [isize; 3] = [-1, -3, -6];

/// Spread `power` across frequency and time, then append it to the ring.
pub fn spread_into_ring(power: &[f32], ring: &mut Ring<Vec<f32>>) {
    debug_assert_eq!(power.len(), BIN_COUNT);

    let mut spread = power.to_vec();

    // Forward 3-tap max over frequency, in place and ascending, so each bin
    // sees its raw (not yet spread) upper neighbors.
    for k in 0..BIN_COUNT - 2 {
        spread[k] = spread[k].max(spread[k + 1]).max(spread[k + 2]);
    }

    for k in 0..BIN_COUNT {
        let mut running_max = spread[k];
        for &offset in &TIME_SPREAD_OFFSETS {
            let cell = &mut ring.at_offset_mut(offset)[k];
            *cell = cell.max(running_max);
            running_max = *cell;
        }
    }

    ring.push(spread);
}

/// A spread ring in its initial state: all slots zeroed.
pub fn empty_spread_ring() -> Ring<Vec<f32>> {
    Ring::new(SPECTRA_RING_SIZE, vec![0.0; BIN_COUNT])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lone_bin(bin: usize, value: f32) -> Vec<f32> {
        let mut power = vec![0.0; BIN_COUNT];
        power[bin] = value;
        power
    }

    #[test]
    fn frequency_spread_reaches_two_bins_down() {
        let mut ring = empty_spread_ring();
        spread_into_ring(&lone_bin(100, 8.0), &mut ring);

        let stored = ring.at_offset(-1);
        assert_eq!(stored[98], 8.0);
        assert_eq!(stored[99], 8.0);
        assert_eq!(stored[100], 8.0);
        assert_eq!(stored[101], 0.0);
        assert_eq!(stored[97], 0.0);
    }

    #[test]
    fn time_spread_updates_recent_history() {
        let mut ring = empty_spread_ring();
        for _ in 0..8 {
            spread_into_ring(&vec![0.0; BIN_COUNT], &mut ring);
        }
        spread_into_ring(&lone_bin(50, 4.0), &mut ring);

        // Cells written 1, 3 and 6 passes before the loud one absorbed it.
        assert_eq!(ring.at_offset(-2)[50], 4.0);
        assert_eq!(ring.at_offset(-4)[50], 4.0);
        assert_eq!(ring.at_offset(-7)[50], 4.0);
        // Others did not.
        assert_eq!(ring.at_offset(-3)[50], 0.0);
        assert_eq!(ring.at_offset(-5)[50], 0.0);
    }

    #[test]
    fn chained_absorb_carries_older_values_forward() {
        let mut ring = empty_spread_ring();

        // Plant a large value six slots back, then push a quiet spectrum.
        for _ in 0..8 {
            spread_into_ring(&vec![0.0; BIN_COUNT], &mut ring);
        }
        ring.at_offset_mut(-3)[10] = 9.0;
        spread_into_ring(&lone_bin(10, 1.0), &mut ring);

        // The -1 cell saw only the new value; the -6 cell kept the larger
        // of its own value and everything absorbed on the way there.
        assert_eq!(ring.at_offset(-2)[10], 1.0);
        assert_eq!(ring.at_offset(-4)[10], 9.0);
        assert_eq!(ring.at_offset(-7)[10], 9.0);
    }
}
