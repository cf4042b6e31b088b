// ct-core/src/units.rs

use uom::si::f64::{
    ElectricalResistance as UomElectricalResistance, Frequency as UomFrequency, Time as UomTime,
};

// Public canonical unit types (SI, f64)
pub type Frequency = UomFrequency;
pub type Resistance = UomElectricalResistance;
pub type Time = UomTime;

#[inline]
pub fn ohms(v: f64) -> Resistance {
    use uom::si::electrical_resistance::ohm;
    Resistance::new::<ohm>(v)
}

#[inline]
pub fn hz(v: f64) -> Frequency {
    use uom::si::frequency::hertz;
    Frequency::new::<hertz>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

pub mod constants {
    use std::f64::consts::PI;

    pub const TWO_PI: f64 = 2.0 * PI;

    /// Angular frequency (rad/s) of a sinusoid at `frequency_hz`.
    #[inline]
    pub fn angular_frequency(frequency_hz: f64) -> f64 {
        TWO_PI * frequency_hz
    }
}
