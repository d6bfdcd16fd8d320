//! Fonte de leituras do simulador.
//!
//! A temperatura vem dos sensores térmicos do host (`sysinfo`) quando
//! disponíveis; umidade e luz são sintéticas, variando lentamente no tempo.

use hub_core::types::Reading;
use std::time::Instant;
use sysinfo::Components;
use tracing::{debug, info};

/// Gerador de leituras de um nó.
pub struct SensorSource {
    node_id: String,
    components: Components,
    started: Instant,
    /// Defasagem para que nós diferentes não gerem curvas idênticas
    phase: f64,
}

impl SensorSource {
    pub fn new(node_id: impl Into<String>) -> Self {
        let node_id = node_id.into();
        let components = Components::new_with_refreshed_list();
        if components.iter().any(|c| c.temperature().is_some()) {
            info!("✓ Sensores térmicos do host: {} componentes", components.iter().count());
        } else {
            info!("✗ Sem sensores térmicos no host – temperatura sintética");
        }

        Self {
            phase: phase_for(&node_id),
            node_id,
            components,
            started: Instant::now(),
        }
    }

    /// Amostra todos os sensores e monta a leitura.
    pub fn sample(&mut self) -> Reading {
        self.components.refresh(true);
        let t = self.started.elapsed().as_secs_f64();

        let temperature = self
            .host_temperature()
            .unwrap_or_else(|| synthetic_temperature(t, self.phase));
        debug!("Temperatura amostrada: {temperature:.1}°C");

        Reading::new(self.node_id.clone())
            .with_temperature(temperature)
            .with_humidity(synthetic_humidity(t, self.phase))
            .with_light(synthetic_light(t, self.phase))
    }

    /// Maior temperatura plausível entre os componentes do host.
    fn host_temperature(&self) -> Option<f32> {
        self.components
            .iter()
            .filter_map(|c| c.temperature())
            .filter(|t| *t > 0.0 && *t < 150.0)
            .reduce(f32::max)
    }
}

fn phase_for(node_id: &str) -> f64 {
    let sum: u32 = node_id.bytes().map(u32::from).sum();
    (sum % 360) as f64 * std::f64::consts::PI / 180.0
}

/// 22 °C ± 3 °C, período de 5 min.
pub fn synthetic_temperature(t: f64, phase: f64) -> f32 {
    (22.0 + 3.0 * (t / 300.0 * std::f64::consts::TAU + phase).sin()) as f32
}

/// 50 % ± 10 %, período de 7 min.
pub fn synthetic_humidity(t: f64, phase: f64) -> f32 {
    (50.0 + 10.0 * (t / 420.0 * std::f64::consts::TAU + phase).cos()) as f32
}

/// 0–1000, período de 10 min.
pub fn synthetic_light(t: f64, phase: f64) -> i32 {
    (500.0 + 500.0 * (t / 600.0 * std::f64::consts::TAU + phase).sin()).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_values_stay_in_range() {
        for step in 0..1200 {
            let t = step as f64 * 0.5;
            let temp = synthetic_temperature(t, 1.0);
            let hum = synthetic_humidity(t, 1.0);
            let light = synthetic_light(t, 1.0);
            assert!((19.0..=25.0).contains(&temp), "temp {temp}");
            assert!((40.0..=60.0).contains(&hum), "hum {hum}");
            assert!((0..=1000).contains(&light), "light {light}");
        }
    }

    #[test]
    fn phase_differs_between_nodes() {
        assert_ne!(phase_for("node-a"), phase_for("node-b"));
        assert_eq!(phase_for("node-a"), phase_for("node-a"));
    }

    #[test]
    fn sample_carries_all_fields() {
        let mut src = SensorSource::new("node-a");
        let r = src.sample();
        assert_eq!(r.node_id, "node-a");
        assert!(r.temperature.is_some());
        assert!(r.humidity.is_some());
        assert!(r.light.is_some());
    }
}
