//! Shelf-life estimation for produce carried in a hielera.
//!
//! The model multiplies a product baseline by three independent penalty
//! factors (temperature, humidity, ethylene). Each factor is 1.0 inside its
//! optimal band and degrades linearly or stepwise outside it. Factors may go
//! negative for extreme inputs; only the final product is clamped at zero.

use crate::product::Product;
use crate::reading::Reading;

/// Lower bound of the optimal cold band, °C
pub const OPTIMAL_TEMPERATURE_MIN: f64 = 0.0;
/// Upper bound of the optimal cold band, °C
pub const OPTIMAL_TEMPERATURE_MAX: f64 = 4.0;
/// Lower bound of the optimal humidity band, %
pub const OPTIMAL_HUMIDITY_MIN: f64 = 80.0;
/// Upper bound of the optimal humidity band, %
pub const OPTIMAL_HUMIDITY_MAX: f64 = 95.0;
/// Ethylene below this level does not accelerate ripening, ppm
pub const ETHYLENE_LOW_THRESHOLD: f64 = 100.0;
/// Ethylene at or above this level triggers the strongest penalty, ppm
pub const ETHYLENE_HIGH_THRESHOLD: f64 = 200.0;

/// Stateless estimator of remaining shelf life in days
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShelfLifeEstimator {
    product: Product,
}

impl Default for ShelfLifeEstimator {
    fn default() -> Self {
        Self::new(Product::default())
    }
}

impl ShelfLifeEstimator {
    pub fn new(product: Product) -> Self {
        Self { product }
    }

    pub fn product(&self) -> Product {
        self.product
    }

    pub fn baseline_days(&self) -> f64 {
        self.product.baseline_days()
    }

    /// Estimate remaining shelf life in days. Total over all inputs and never
    /// negative.
    pub fn estimate(&self, temperature: f64, humidity: f64, ethylene: f64) -> f64 {
        let days = self.baseline_days()
            * temperature_factor(temperature)
            * humidity_factor(humidity)
            * ethylene_factor(ethylene);

        // f64::max returns the non-NaN operand, so a NaN product clamps to zero
        days.max(0.0)
    }

    pub fn estimate_reading(&self, reading: &Reading) -> f64 {
        self.estimate(reading.temperature(), reading.humidity(), reading.ethylene())
    }

    /// Estimate every reading independently, preserving order
    pub fn estimate_series(&self, readings: &[Reading]) -> Vec<f64> {
        readings.iter().map(|r| self.estimate_reading(r)).collect()
    }
}

fn temperature_factor(temperature: f64) -> f64 {
    if (OPTIMAL_TEMPERATURE_MIN..=OPTIMAL_TEMPERATURE_MAX).contains(&temperature) {
        1.0
    } else if temperature < OPTIMAL_TEMPERATURE_MIN {
        // freeze damage
        0.9 - temperature.abs() * 0.02
    } else {
        1.0 - (temperature - OPTIMAL_TEMPERATURE_MAX) * 0.1
    }
}

fn humidity_factor(humidity: f64) -> f64 {
    if (OPTIMAL_HUMIDITY_MIN..=OPTIMAL_HUMIDITY_MAX).contains(&humidity) {
        1.0
    } else if humidity < OPTIMAL_HUMIDITY_MIN {
        // dehydration
        0.9 - (OPTIMAL_HUMIDITY_MIN - humidity) * 0.01
    } else {
        0.95 - (humidity - OPTIMAL_HUMIDITY_MAX) * 0.02
    }
}

fn ethylene_factor(ethylene: f64) -> f64 {
    if ethylene < ETHYLENE_LOW_THRESHOLD {
        1.0
    } else if ethylene < ETHYLENE_HIGH_THRESHOLD {
        0.8
    } else {
        0.5
    }
}
