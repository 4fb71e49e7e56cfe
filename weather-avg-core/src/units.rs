/// Most fractional digits [`round_to`] honours; an `f64` carries no more than this.
pub const MAX_DECIMAL_PLACES: u32 = 15;

/// Convert Fahrenheit to Celsius, rounded to the nearest whole degree (ties to even).
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    ((fahrenheit - 32.0) * 5.0 / 9.0).round_ties_even()
}

/// Round `value` to `places` decimal places, ties to even. `places` is capped at
/// [`MAX_DECIMAL_PLACES`].
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places.min(MAX_DECIMAL_PLACES) as i32);
    (value * factor).round_ties_even() / factor
}
