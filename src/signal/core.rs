use std::fmt;

use tokio::time;

use super::error::ThresholdTableValidationError;

/// An RGB color triple, in the actuator's native 8-bit-per-channel range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    r: u8,
    g: u8,
    b: u8,
}

impl Rgb {
    pub const RED: Self = Self::new(255, 0, 0);
    pub const GREEN: Self = Self::new(0, 255, 0);
    pub const YELLOW: Self = Self::new(255, 255, 0);
    pub const OFF: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn r(self) -> u8 {
        self.r
    }

    pub fn g(self) -> u8 {
        self.g
    }

    pub fn b(self) -> u8 {
        self.b
    }
}

impl fmt::Display for Rgb {
    /// Formats as `r,g,b`, the form `blink1-tool --rgb` takes.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

/// Parameters of a pulse: full off-and-back-on period plus how many pulses
/// one actuator command performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkPattern {
    period: time::Duration,
    repetitions: u8,
}

impl Default for BlinkPattern {
    fn default() -> Self {
        Self {
            period: time::Duration::from_secs(1),
            repetitions: 1,
        }
    }
}

impl BlinkPattern {
    pub fn new(period: time::Duration, repetitions: u8) -> Self {
        Self {
            period,
            repetitions,
        }
    }

    pub fn period(self) -> time::Duration {
        self.period
    }

    pub fn repetitions(self) -> u8 {
        self.repetitions
    }
}

/// The engine's current visual intent: a color, steady or pulsing.
///
/// Exactly one state is active at a time; the poll loop replaces it whole,
/// never field by field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalState {
    color: Rgb,
    blink: Option<BlinkPattern>,
}

impl SignalState {
    pub fn steady(color: Rgb) -> Self {
        Self { color, blink: None }
    }

    pub fn blinking(color: Rgb, pattern: BlinkPattern) -> Self {
        Self {
            color,
            blink: Some(pattern),
        }
    }

    pub fn color(self) -> Rgb {
        self.color
    }

    pub fn blink(self) -> Option<BlinkPattern> {
        self.blink
    }

    pub fn is_blinking(self) -> bool {
        self.blink.is_some()
    }
}

impl fmt::Display for SignalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_blinking() {
            write!(f, "{} (blinking)", self.color)
        } else {
            write!(f, "{} (steady)", self.color)
        }
    }
}

/// One row of the threshold table: the state shown while the seconds until
/// departure are strictly greater than `above_secs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdBand {
    above_secs: i64,
    state: SignalState,
}

impl ThresholdBand {
    pub fn new(above_secs: i64, state: SignalState) -> Self {
        Self { above_secs, state }
    }

    pub fn above_secs(self) -> i64 {
        self.above_secs
    }

    pub fn state(self) -> SignalState {
        self.state
    }
}

/// Ordered seconds-to-state mapping with a most-urgent fallback.
///
/// Bands are evaluated top to bottom, first match wins, matching on a strict
/// `seconds > above_secs` bound. Any seconds value below every band, and
/// the "no relevant departure" case, maps to the fallback state, so the
/// mapping is total over `Option<i64>`.
///
/// The exact cutoffs are a product decision, not an engineering constant;
/// deployments have run both the 900/720/600/480 variant (the default here)
/// and collapsed bands with a 1200s red cutoff. Hence a table, not code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdTable {
    bands: Vec<ThresholdBand>,
    fallback: SignalState,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        let bands = vec![
            ThresholdBand::new(900, SignalState::steady(Rgb::RED)),
            ThresholdBand::new(720, SignalState::steady(Rgb::GREEN)),
            ThresholdBand::new(600, SignalState::steady(Rgb::YELLOW)),
            ThresholdBand::new(
                480,
                SignalState::blinking(Rgb::YELLOW, BlinkPattern::default()),
            ),
        ];

        Self::new(bands, SignalState::steady(Rgb::RED)).expect("default table is descending")
    }
}

impl ThresholdTable {
    /// Builds a table, rejecting bounds that are not strictly descending
    /// (an out-of-order band could never match and would silently distort
    /// the mapping).
    pub fn new(
        bands: Vec<ThresholdBand>,
        fallback: SignalState,
    ) -> Result<Self, ThresholdTableValidationError> {
        for pair in bands.windows(2) {
            if pair[1].above_secs >= pair[0].above_secs {
                return Err(ThresholdTableValidationError::NotDescending {
                    prev: pair[0].above_secs,
                    next: pair[1].above_secs,
                });
            }
        }

        Ok(Self { bands, fallback })
    }

    pub fn bands(&self) -> &[ThresholdBand] {
        &self.bands
    }

    pub fn fallback(&self) -> SignalState {
        self.fallback
    }

    /// Maps seconds-until-departure onto a signal state.
    ///
    /// `None` (no relevant departure) is treated as negative infinity and
    /// lands on the fallback, so absence of data shows the most urgent
    /// state rather than "plenty of time".
    pub fn state_for(&self, seconds: Option<i64>) -> SignalState {
        let Some(seconds) = seconds else {
            return self.fallback;
        };

        self.bands
            .iter()
            .find(|band| seconds > band.above_secs)
            .map(|band| band.state)
            .unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_matches_documented_bands() {
        let table = ThresholdTable::default();

        assert_eq!(table.state_for(Some(901)), SignalState::steady(Rgb::RED));
        assert_eq!(table.state_for(Some(900)), SignalState::steady(Rgb::GREEN));
        assert_eq!(table.state_for(Some(721)), SignalState::steady(Rgb::GREEN));
        assert_eq!(table.state_for(Some(720)), SignalState::steady(Rgb::YELLOW));
        assert_eq!(table.state_for(Some(601)), SignalState::steady(Rgb::YELLOW));
        assert!(table.state_for(Some(600)).is_blinking());
        assert!(table.state_for(Some(481)).is_blinking());
        assert_eq!(table.state_for(Some(480)), SignalState::steady(Rgb::RED));
        assert_eq!(table.state_for(Some(0)), SignalState::steady(Rgb::RED));
    }

    #[test]
    fn mapping_is_total_over_the_integer_range() {
        let table = ThresholdTable::default();

        // Spot checks across the whole range, including extremes; every
        // input maps to exactly one state by construction.
        for seconds in [i64::MIN, -1_000_000, -1, 0, 479, 481, 899, 901, i64::MAX] {
            let _ = table.state_for(Some(seconds));
        }
    }

    #[test]
    fn negative_seconds_map_to_the_most_urgent_state() {
        let table = ThresholdTable::default();
        assert_eq!(table.state_for(Some(-300)), table.fallback());
    }

    #[test]
    fn none_maps_to_the_fallback_state() {
        let table = ThresholdTable::default();
        assert_eq!(table.state_for(None), SignalState::steady(Rgb::RED));
    }

    #[test]
    fn rejects_non_descending_bands() {
        let bands = vec![
            ThresholdBand::new(600, SignalState::steady(Rgb::GREEN)),
            ThresholdBand::new(900, SignalState::steady(Rgb::RED)),
        ];

        assert_eq!(
            ThresholdTable::new(bands, SignalState::steady(Rgb::RED)),
            Err(ThresholdTableValidationError::NotDescending {
                prev: 600,
                next: 900
            })
        );
    }

    #[test]
    fn rejects_duplicate_bounds() {
        let bands = vec![
            ThresholdBand::new(900, SignalState::steady(Rgb::RED)),
            ThresholdBand::new(900, SignalState::steady(Rgb::GREEN)),
        ];

        assert!(ThresholdTable::new(bands, SignalState::steady(Rgb::RED)).is_err());
    }

    #[test]
    fn empty_table_always_falls_back() {
        let table = ThresholdTable::new(Vec::new(), SignalState::steady(Rgb::RED)).unwrap();
        assert_eq!(table.state_for(Some(10_000)), SignalState::steady(Rgb::RED));
        assert_eq!(table.state_for(None), SignalState::steady(Rgb::RED));
    }

    #[test]
    fn custom_collapsed_band_variant_works() {
        // The historical variant: 1200s red cutoff, single yellow band.
        let bands = vec![
            ThresholdBand::new(1200, SignalState::steady(Rgb::RED)),
            ThresholdBand::new(600, SignalState::steady(Rgb::YELLOW)),
        ];
        let table = ThresholdTable::new(bands, SignalState::steady(Rgb::RED)).unwrap();

        assert_eq!(table.state_for(Some(1500)), SignalState::steady(Rgb::RED));
        assert_eq!(table.state_for(Some(800)), SignalState::steady(Rgb::YELLOW));
        assert_eq!(table.state_for(Some(300)), SignalState::steady(Rgb::RED));
    }

    #[test]
    fn bands_appear_in_order_as_seconds_shrink() {
        // Walking down from far-future to long-past crosses every band
        // exactly once, in table order, ending on the fallback.
        let table = ThresholdTable::default();
        let mut segments = Vec::new();

        for seconds in (-1200..=1800).rev() {
            let state = table.state_for(Some(seconds));
            if segments.last() != Some(&state) {
                segments.push(state);
            }
        }

        assert_eq!(
            segments,
            vec![
                SignalState::steady(Rgb::RED),
                SignalState::steady(Rgb::GREEN),
                SignalState::steady(Rgb::YELLOW),
                SignalState::blinking(Rgb::YELLOW, BlinkPattern::default()),
                SignalState::steady(Rgb::RED),
            ]
        );
    }

    #[test]
    fn rgb_displays_in_actuator_argument_form() {
        assert_eq!(Rgb::YELLOW.to_string(), "255,255,0");
        assert_eq!(Rgb::new(1, 2, 3).to_string(), "1,2,3");
    }
}
